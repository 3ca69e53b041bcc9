//! Emulated execution backend.

use tracing::debug;

use crate::analysis::Analysis;
use crate::engine::Engine;
use crate::image::LoadedImage;
use crate::types::Address;

/// Drives a decoded image under the CPU emulator.
///
/// The emulator's instruction semantics live in the emulation collaborator;
/// this backend owns the decoded image, the initial program counter, and the
/// analysis state the emulator feeds.
#[derive(Debug)]
pub struct EmulatedDebugger
{
    analysis: Analysis,
    label: String,
    pc: Option<Address>,
}

impl EmulatedDebugger
{
    /// Wrap a decoded image for emulation.
    ///
    /// The pc starts at the image's declared entry until the launcher
    /// focuses the first explicit entrypoint.
    #[must_use]
    pub fn new(image: LoadedImage) -> Self
    {
        let label = format!("emu:{}", image.path.display());
        let pc = image.entry;
        Self {
            analysis: Analysis::with_image(image),
            label,
            pc,
        }
    }

    /// Current program counter.
    #[must_use]
    pub fn pc(&self) -> Option<Address>
    {
        self.pc
    }
}

impl Engine for EmulatedDebugger
{
    fn describe(&self) -> String
    {
        self.label.clone()
    }

    fn analysis(&self) -> &Analysis
    {
        &self.analysis
    }

    fn analysis_mut(&mut self) -> &mut Analysis
    {
        &mut self.analysis
    }

    fn set_pc(&mut self, addr: Address)
    {
        debug!(%addr, "emulator pc set");
        self.pc = Some(addr);
    }
}

//! Static disassembly backend.

use crate::analysis::Analysis;
use crate::engine::Engine;
use crate::image::LoadedImage;

/// Disassembles a file on disk without executing it.
///
/// This is the default backend: any target string that is not a `live:`,
/// `emu:`, or host:port target lands here, as does launching with no target
/// at all (an empty window the operator can load a file into later).
#[derive(Debug)]
pub struct StaticDisassembler
{
    analysis: Analysis,
    label: String,
}

impl StaticDisassembler
{
    /// Backend over a decoded image.
    #[must_use]
    pub fn new(image: LoadedImage) -> Self
    {
        let label = image.path.display().to_string();
        Self {
            analysis: Analysis::with_image(image),
            label,
        }
    }

    /// Backend with no file loaded.
    #[must_use]
    pub fn empty() -> Self
    {
        Self {
            analysis: Analysis::empty(),
            label: "(no target)".to_string(),
        }
    }
}

impl Engine for StaticDisassembler
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
}

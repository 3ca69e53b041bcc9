//! # Engine Trait and Backend Factory
//!
//! The main interface every analysis/debug backend implements, plus the
//! factory that builds the right backend for a classified target.
//!
//! ## Why use a trait?
//!
//! The launcher pipeline (artifact loading, entrypoint dispatch, session
//! replay, the window) is identical across backends; only construction and a
//! handful of operations differ. The trait keeps the pipeline generic over
//! the four variants, and the factory performs the only `match` on target
//! kind in the whole workspace.
//!
//! ## Lifecycle
//!
//! Exactly one engine exists per process lifetime. It is built once by
//! [`build_engine`], then mutated in place by the later pipeline stages; no
//! locking is needed because everything runs on one thread.

use tracing::info;

use crate::analysis::Analysis;
use crate::engines::emulated::EmulatedDebugger;
use crate::engines::live::LiveProcessDebugger;
use crate::engines::remote::RemoteDebugger;
use crate::engines::static_dasm::StaticDisassembler;
use crate::entrypoint::Entrypoint;
use crate::error::Result;
use crate::image::LoadedImage;
use crate::options::Options;
use crate::registry::{self, Cpu};
use crate::target::{Locator, TargetKind, TargetSpec};
use crate::types::Address;

/// Analysis/debug backend driving one session.
pub trait Engine: std::fmt::Debug
{
    /// Human-readable identifier of the target, used to annotate the window
    /// title: `pid:module-path` for a live attach, the literal target string
    /// otherwise.
    fn describe(&self) -> String;

    /// Shared analysis state (labels, comments, cursor, roots).
    fn analysis(&self) -> &Analysis;

    /// Mutable access to the analysis state.
    fn analysis_mut(&mut self) -> &mut Analysis;

    /// Queue a disassembly from the given entrypoint.
    ///
    /// A label the analysis cannot resolve yet is queued as-is for the
    /// disassembler collaborator to resolve. Returns the resolved address
    /// when one is known.
    fn disassemble(&mut self, ep: &Entrypoint) -> Result<Option<Address>>
    {
        Ok(queue_root(self.analysis_mut(), ep, false))
    }

    /// Queue a fast-and-shallow disassembly from the given entrypoint.
    fn disassemble_fast(&mut self, ep: &Entrypoint) -> Result<Option<Address>>
    {
        Ok(queue_root(self.analysis_mut(), ep, true))
    }

    /// The target's own entrypoint set: the declared entry address plus
    /// exported symbols. Empty for targets without a decoded image.
    fn default_entrypoints(&self) -> Vec<Entrypoint>
    {
        let Some(image) = self.analysis().image() else {
            return Vec::new();
        };

        let mut eps: Vec<Entrypoint> = Vec::new();
        if let Some(entry) = image.entry {
            eps.push(Entrypoint::Address(entry));
        }
        for (_, addr) in image.exports() {
            let ep = Entrypoint::Address(addr);
            if !eps.contains(&ep) {
                eps.push(ep);
            }
        }
        eps
    }

    /// Load a map file of addr <-> name associations.
    ///
    /// ## Errors
    ///
    /// Map files are curated inputs; failures are fatal `ArtifactLoad`
    /// errors.
    fn load_map(&mut self, path: &std::path::Path) -> Result<()>
    {
        self.analysis_mut().load_map(path)
    }

    /// Read C function prototypes from a header file.
    ///
    /// ## Errors
    ///
    /// Header files are curated inputs; failures are fatal `ArtifactLoad`
    /// errors.
    fn parse_header(&mut self, path: &std::path::Path) -> Result<()>
    {
        self.analysis_mut().parse_header(path)
    }

    /// Load a plugin script.
    ///
    /// ## Errors
    ///
    /// A `Script` error with the file and line of the first failing
    /// command. Callers on the artifact path catch this per plugin.
    fn load_plugin(&mut self, path: &std::path::Path) -> Result<()>
    {
        crate::script::run_file(self, path)
    }

    /// Evaluate a hook-code string.
    ///
    /// ## Errors
    ///
    /// A `Script` error naming `<eval>`; fatal, unlike plugin failures.
    fn eval_hook(&mut self, code: &str) -> Result<()>
    {
        crate::script::run_str(self, code)
    }

    /// Set the initial program counter. Only meaningful for the emulated
    /// backend; the default implementation ignores it.
    fn set_pc(&mut self, _addr: Address) {}
}

fn queue_root(analysis: &mut Analysis, ep: &Entrypoint, fast: bool) -> Option<Address>
{
    match ep {
        Entrypoint::Address(addr) => {
            analysis.push_root(*addr, fast);
            Some(*addr)
        }
        Entrypoint::Label(name) => match analysis.resolve_label(name) {
            Some(addr) => {
                analysis.push_root(addr, fast);
                Some(addr)
            }
            None => {
                analysis.push_pending_root(name, fast);
                None
            }
        },
    }
}

/// Build the engine matching a classified target.
///
/// Construction is all-or-nothing: any failure here is fatal and no partial
/// engine is returned. `rebase` is applied to static images before this
/// function returns, so entrypoint resolution always sees the final address
/// space.
///
/// ## Errors
///
/// - `UnknownCpu` / `UnknownFormat` for bad registry identifiers
/// - `DecodeFailure` for undecodable files
/// - `TargetNotFound` for missing live processes or unreachable endpoints
pub fn build_engine(spec: &TargetSpec, options: &Options) -> Result<Box<dyn Engine>>
{
    let cpu_override = options.cpu.as_deref().map(registry::lookup_cpu).transpose()?;
    let format_override = options.exe_format.as_deref().map(registry::lookup_format).transpose()?;

    let engine: Box<dyn Engine> = match (&spec.kind, &spec.locator) {
        (TargetKind::StaticExecutable, Locator::None) => Box::new(StaticDisassembler::empty()),
        (TargetKind::StaticExecutable, Locator::Path(path)) => {
            let mut image = LoadedImage::decode_file(path, cpu_override, format_override)?;
            if let Some(base) = options.rebase {
                image.rebase(Address::new(base));
            }
            Box::new(StaticDisassembler::new(image))
        }
        (TargetKind::Emulated, Locator::Path(path)) => {
            let image = LoadedImage::decode_file(path, cpu_override, format_override)?;
            Box::new(EmulatedDebugger::new(image))
        }
        (TargetKind::RemoteDebug, Locator::Endpoint(endpoint)) => {
            Box::new(RemoteDebugger::connect(endpoint, cpu_override.unwrap_or(Cpu::host()))?)
        }
        (TargetKind::LiveProcess, locator) => Box::new(LiveProcessDebugger::attach_to(locator)?),
        // Classification never produces these pairings.
        (kind, locator) => unreachable!("inconsistent target spec: {kind:?} / {locator:?}"),
    };

    // Tuning flags travel with the analysis instead of process globals.
    Ok(finish_engine(engine, options))
}

fn finish_engine(mut engine: Box<dyn Engine>, options: &Options) -> Box<dyn Engine>
{
    let analysis = engine.analysis_mut();
    if options.no_data_trace {
        analysis.backtrace_data = false;
    }
    if options.debug_backtrace {
        analysis.debug_backtrace = true;
    }
    if options.decompile {
        analysis.decompile = true;
    }

    info!(engine = %engine.describe(), "engine ready");
    engine
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::target::classify;

    #[test]
    fn test_static_engine_from_elf()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog");
        std::fs::write(&path, crate::image::tests::tiny_elf(0x40_1000)).unwrap();

        let spec = classify(Some(path.to_str().unwrap()));
        let engine = build_engine(&spec, &Options::default()).unwrap();
        let image = engine.analysis().image().unwrap();
        assert_eq!(image.entry, Some(Address::new(0x40_1000)));
        assert_eq!(engine.default_entrypoints(), vec![Entrypoint::Address(Address::new(0x40_1000))]);
    }

    #[test]
    fn test_rebase_applies_before_entrypoints()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog");
        std::fs::write(&path, crate::image::tests::tiny_elf(0x40)).unwrap();

        let options = Options {
            rebase: Some(0x7000_0000),
            ..Options::default()
        };
        let spec = classify(Some(path.to_str().unwrap()));
        let engine = build_engine(&spec, &options).unwrap();
        assert_eq!(
            engine.default_entrypoints(),
            vec![Entrypoint::Address(Address::new(0x7000_0040))]
        );
    }

    #[test]
    fn test_empty_static_window()
    {
        let spec = classify(None);
        let engine = build_engine(&spec, &Options::default()).unwrap();
        assert!(engine.analysis().image().is_none());
        assert!(engine.default_entrypoints().is_empty());
    }

    #[test]
    fn test_unknown_cpu_fails_construction()
    {
        let options = Options {
            cpu: Some("z80".to_string()),
            ..Options::default()
        };
        let spec = classify(None);
        assert!(build_engine(&spec, &options).is_err());
    }

    #[test]
    fn test_tuning_flags_reach_analysis()
    {
        let options = Options {
            no_data_trace: true,
            debug_backtrace: true,
            ..Options::default()
        };
        let spec = classify(None);
        let engine = build_engine(&spec, &options).unwrap();
        assert!(!engine.analysis().backtrace_data);
        assert!(engine.analysis().debug_backtrace);
    }

    #[test]
    fn test_unresolved_label_is_queued_pending()
    {
        let spec = classify(None);
        let mut engine = build_engine(&spec, &Options::default()).unwrap();
        let resolved = engine.disassemble(&Entrypoint::Label("start".to_string())).unwrap();
        assert_eq!(resolved, None);
        assert_eq!(engine.analysis().roots()[0].label.as_deref(), Some("start"));
    }
}

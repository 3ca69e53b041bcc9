//! # Target Resolution Pipeline
//!
//! The entry point of the library: classifies the raw target string, builds
//! the matching engine, attaches artifacts, resolves and dispatches
//! entrypoints, and hands the assembled session back to the caller.
//!
//! Every stage takes the engine `&mut` and returns control: the engine is
//! owned here, not shared. Failures in classification, engine construction,
//! artifact (map/header) loading, and entrypoint parsing abort the whole
//! launch; only per-plugin failures are recovered.

use tracing::debug;

use crate::artifacts::{self, PluginLoadResult};
use crate::engine::{build_engine, Engine};
use crate::entrypoint::{resolve_entrypoints, Entrypoint};
use crate::error::Result;
use crate::options::Options;
use crate::target::{classify, TargetKind, TargetSpec};

/// Everything a launch produces: the classified target, the single engine,
/// the effective (autoload-enriched) options, per-plugin outcomes, and the
/// resolved entrypoint list.
#[derive(Debug)]
pub struct ResolvedSession
{
    /// Classified target
    pub spec: TargetSpec,
    /// The one engine of this session
    pub engine: Box<dyn Engine>,
    /// Options after autoload enrichment; read these, not the CLI bag
    pub options: Options,
    /// Per-plugin load outcomes, in supply order
    pub plugin_results: Vec<PluginLoadResult>,
    /// Entrypoints in dispatch order (explicit first)
    pub entrypoints: Vec<Entrypoint>,
}

/// Resolve a raw target into a running session.
///
/// Pipeline order:
///
/// 1. classify the target string (never fails);
/// 2. autoload sibling artifacts for file-backed static targets;
/// 3. build the engine (rebase happens inside, before anything reads
///    addresses);
/// 4. load map/header/plugins;
/// 5. parse entrypoint tokens and append the default set under
///    `--disassemble-all-entrypoints`;
/// 6. dispatch each entrypoint to the engine (`--fast` selects the shallow
///    pass) and focus the first one: for emulated targets it also becomes
///    the initial pc.
///
/// ## Errors
///
/// Any fatal error from the stages above; see [`crate::error::VantageError`].
pub fn resolve(raw_target: Option<&str>, entry_args: &[String], options: &Options) -> Result<ResolvedSession>
{
    let spec = classify(raw_target);
    debug!(kind = %spec.kind, raw = spec.raw.as_deref().unwrap_or("<none>"), "classified target");

    let options = match (options.autoload, spec.kind, spec.path()) {
        (true, TargetKind::StaticExecutable, Some(path)) => artifacts::autoload(options, path),
        _ => options.clone(),
    };

    let mut engine = build_engine(&spec, &options)?;

    let plugin_results = artifacts::apply_artifacts(engine.as_mut(), &options)?;

    let entrypoints = resolve_entrypoints(entry_args, options.dasm_all_entrypoints, engine.as_ref())?;

    for ep in &entrypoints {
        if options.fast {
            engine.disassemble_fast(ep)?;
        } else {
            engine.disassemble(ep)?;
        }
    }

    if let Some(first) = entrypoints.first() {
        let addr = match first {
            Entrypoint::Address(addr) => Some(*addr),
            Entrypoint::Label(name) => engine.analysis().resolve_label(name),
        };
        if let Some(addr) = addr {
            engine.analysis_mut().focus(addr);
            engine.set_pc(addr);
        }
    }

    Ok(ResolvedSession {
        spec,
        engine,
        options,
        plugin_results,
        entrypoints,
    })
}

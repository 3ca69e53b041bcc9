//! # Artifact Loading
//!
//! Attaches the optional auxiliary inputs: map file, C header, plugins -
//! to a freshly built engine, and derives them from the target's filename
//! under `--autoload`.
//!
//! The fault model is deliberately split: map and header files are curated
//! operator inputs, so a failure there aborts startup; plugins are untrusted
//! code, so each one loads inside its own failure boundary and a broken
//! plugin never prevents the remaining plugins from loading or the session
//! from starting.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::engine::Engine;
use crate::error::Result;
use crate::options::Options;

/// File extension of autoloadable plugin scripts.
pub const PLUGIN_EXTENSION: &str = "vplug";

/// File extension of session files.
pub const SESSION_EXTENSION: &str = "vantage-session";

/// Outcome of one plugin load attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginLoadResult
{
    /// The plugin that was attempted
    pub path: PathBuf,
    /// Whether it loaded cleanly
    pub succeeded: bool,
    /// Failure description when it did not
    pub error: Option<String>,
}

/// Derive sibling artifacts from the target's base filename.
///
/// Strips a trailing short (1–3 character) extension from the target path
/// and probes for `<base>.map`, `<base>.h`, `<base>.vplug`, and
/// `<base>.vantage-session`. Each derived path fills its option only when
/// the file exists on storage and the option was not explicitly supplied -
/// explicit CLI values always win. Returns an enriched copy; the input bag
/// is never mutated.
#[must_use]
pub fn autoload(options: &Options, target: &Path) -> Options
{
    let mut enriched = options.clone();
    let base = strip_short_extension(target);

    let probe = |ext: &str| {
        let candidate = PathBuf::from(format!("{}.{ext}", base.display()));
        candidate.exists().then_some(candidate)
    };

    if enriched.map_file.is_none() {
        if let Some(found) = probe("map") {
            debug!(path = %found.display(), "autoloading map file");
            enriched.map_file = Some(found);
        }
    }
    if enriched.c_header.is_none() {
        if let Some(found) = probe("h") {
            debug!(path = %found.display(), "autoloading header file");
            enriched.c_header = Some(found);
        }
    }
    if enriched.plugins.is_empty() {
        if let Some(found) = probe(PLUGIN_EXTENSION) {
            debug!(path = %found.display(), "autoloading plugin");
            enriched.plugins.push(found);
        }
    }
    if enriched.session_file.is_none() {
        if let Some(found) = probe(SESSION_EXTENSION) {
            debug!(path = %found.display(), "autoloading session file");
            enriched.session_file = Some(found);
        }
    }

    enriched
}

/// Strip the last extension when it is short enough to look like a file
/// suffix (`.exe`, `.so`, `.1`), keeping longer dotted names intact.
fn strip_short_extension(path: &Path) -> PathBuf
{
    match path.extension() {
        Some(ext) if (1..=3).contains(&ext.len()) => path.with_extension(""),
        _ => path.to_path_buf(),
    }
}

/// Load map file, header file, and plugins into the engine.
///
/// Map and header load synchronously and abort on failure. Plugins load in
/// the order supplied, each isolated: failures are reported to the operator
/// stream with the plugin path and description, recorded in the returned
/// list, and never stop the remaining plugins or the session.
///
/// ## Errors
///
/// [`crate::error::VantageError::ArtifactLoad`] from the map or header path
/// only; plugin failures are not errors at this boundary.
pub fn apply_artifacts(engine: &mut dyn Engine, options: &Options) -> Result<Vec<PluginLoadResult>>
{
    if let Some(map) = &options.map_file {
        engine.load_map(map)?;
    }
    if let Some(header) = &options.c_header {
        engine.parse_header(header)?;
    }

    let mut results = Vec::with_capacity(options.plugins.len());
    for plugin in &options.plugins {
        match engine.load_plugin(plugin) {
            Ok(()) => {
                info!(path = %plugin.display(), "plugin loaded");
                results.push(PluginLoadResult {
                    path: plugin.clone(),
                    succeeded: true,
                    error: None,
                });
            }
            Err(err) => {
                error!(path = %plugin.display(), %err, "plugin failed to load");
                results.push(PluginLoadResult {
                    path: plugin.clone(),
                    succeeded: false,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use super::*;
    use crate::engines::static_dasm::StaticDisassembler;

    #[test]
    fn test_autoload_fills_only_existing_siblings()
    {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("prog.exe");
        fs::write(&target, b"x").unwrap();
        fs::write(dir.path().join("prog.map"), "0x10 main\n").unwrap();
        // No prog.h, no prog.vplug, no prog.vantage-session.

        let enriched = autoload(&Options::default(), &target);
        assert_eq!(enriched.map_file, Some(dir.path().join("prog.map")));
        assert_eq!(enriched.c_header, None);
        assert!(enriched.plugins.is_empty());
        assert_eq!(enriched.session_file, None);
    }

    #[test]
    fn test_autoload_never_overwrites_explicit_values()
    {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("prog.exe");
        fs::write(&target, b"x").unwrap();
        fs::write(dir.path().join("prog.map"), "0x10 main\n").unwrap();
        fs::write(dir.path().join("prog.vplug"), "echo hi\n").unwrap();

        let explicit = Options {
            map_file: Some(PathBuf::from("explicit.map")),
            plugins: vec![PathBuf::from("explicit.vplug")],
            ..Options::default()
        };
        let enriched = autoload(&explicit, &target);
        assert_eq!(enriched.map_file, Some(PathBuf::from("explicit.map")));
        assert_eq!(enriched.plugins, vec![PathBuf::from("explicit.vplug")]);
    }

    #[test]
    fn test_strip_short_extension()
    {
        assert_eq!(strip_short_extension(Path::new("a/prog.exe")), PathBuf::from("a/prog"));
        assert_eq!(strip_short_extension(Path::new("prog.so")), PathBuf::from("prog"));
        assert_eq!(strip_short_extension(Path::new("prog")), PathBuf::from("prog"));
        // A long "extension" is part of the name.
        assert_eq!(
            strip_short_extension(Path::new("prog.backup")),
            PathBuf::from("prog.backup")
        );
    }

    #[test]
    fn test_one_failing_plugin_does_not_stop_the_rest()
    {
        let dir = tempfile::tempdir().unwrap();
        let good1 = dir.path().join("one.vplug");
        let bad = dir.path().join("two.vplug");
        let good2 = dir.path().join("three.vplug");
        fs::write(&good1, "rename 0x10 first\n").unwrap();
        fs::write(&bad, "explode violently\n").unwrap();
        fs::write(&good2, "rename 0x20 third\n").unwrap();

        let options = Options {
            plugins: vec![good1.clone(), bad.clone(), good2.clone()],
            ..Options::default()
        };

        let mut engine = StaticDisassembler::empty();
        let results = apply_artifacts(&mut engine, &options).unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].succeeded);
        assert!(!results[1].succeeded);
        assert!(results[1].error.as_deref().unwrap().contains("explode"));
        assert!(results[2].succeeded);

        // Both good plugins took effect.
        let analysis = engine.analysis();
        assert_eq!(analysis.label_at(crate::types::Address::new(0x10)), Some("first"));
        assert_eq!(analysis.label_at(crate::types::Address::new(0x20)), Some("third"));
    }

    #[test]
    fn test_malformed_map_aborts()
    {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("bad.map");
        fs::write(&map, "not-an-addr main\n").unwrap();

        let options = Options {
            map_file: Some(map),
            ..Options::default()
        };
        let mut engine = StaticDisassembler::empty();
        assert!(apply_artifacts(&mut engine, &options).is_err());
    }
}

//! # Target Classification
//!
//! Turns the free-form positional target string into a typed [`TargetSpec`].
//!
//! Classification is a first-match-wins cascade and never fails: anything
//! that is not a `live:` target, an `emu:` target, or a host:port endpoint
//! falls through to static-executable analysis. An absent target string is
//! also valid and means an empty static-analysis window.

use std::fmt;
use std::path::{Path, PathBuf};

/// Which kind of backend a target string selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind
{
    /// Attach to (or spawn) a running process
    LiveProcess,
    /// Load a file and drive it under the emulator
    Emulated,
    /// Connect to a remote debug-server endpoint
    RemoteDebug,
    /// Disassemble a file on disk (or open an empty window)
    StaticExecutable,
}

impl fmt::Display for TargetKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            TargetKind::LiveProcess => write!(f, "live process"),
            TargetKind::Emulated => write!(f, "emulated"),
            TargetKind::RemoteDebug => write!(f, "remote debug"),
            TargetKind::StaticExecutable => write!(f, "static executable"),
        }
    }
}

/// Where the backend should find its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator
{
    /// Numeric pid of a running process
    Pid(u32),
    /// Substring filter over running process names
    ProcessName(String),
    /// File on disk
    Path(PathBuf),
    /// Remote endpoint, scheme included if one was given
    Endpoint(String),
    /// No target at all (empty static window)
    None,
}

/// A classified target: the raw string plus its kind and locator.
///
/// Immutable once built; classification happens exactly once per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec
{
    /// The target string as typed, if any
    pub raw: Option<String>,
    /// Backend kind selected by classification
    pub kind: TargetKind,
    /// Typed locator extracted from the raw string
    pub locator: Locator,
}

impl TargetSpec
{
    /// File path of the target, for file-backed kinds.
    #[must_use]
    pub fn path(&self) -> Option<&Path>
    {
        match &self.locator {
            Locator::Path(p) => Some(p.as_path()),
            _ => None,
        }
    }
}

/// Classify a raw target string.
///
/// Order, first match wins:
///
/// 1. `live:<pid-or-name>`: numeric remainder is a pid, anything else a
///    process-name substring filter.
/// 2. `emu:<path>`: file to run under the emulator.
/// 3. `[tcp:|udp:]<host>:<port>`: remote debug endpoint. The host needs at
///    least two characters (so `C:\tool.exe` stays a path) and the port must
///    be numeric.
/// 4. Anything else: a file path for static analysis; `None` means an empty
///    static window.
#[must_use]
pub fn classify(raw: Option<&str>) -> TargetSpec
{
    let Some(raw) = raw else {
        return TargetSpec {
            raw: None,
            kind: TargetKind::StaticExecutable,
            locator: Locator::None,
        };
    };

    let spec = |kind, locator| TargetSpec {
        raw: Some(raw.to_string()),
        kind,
        locator,
    };

    if let Some(rest) = raw.strip_prefix("live:") {
        let locator = match rest.parse::<u32>() {
            Ok(pid) => Locator::Pid(pid),
            Err(_) => Locator::ProcessName(rest.to_string()),
        };
        return spec(TargetKind::LiveProcess, locator);
    }

    if let Some(rest) = raw.strip_prefix("emu:") {
        return spec(TargetKind::Emulated, Locator::Path(PathBuf::from(rest)));
    }

    if is_endpoint(raw) {
        return spec(TargetKind::RemoteDebug, Locator::Endpoint(raw.to_string()));
    }

    spec(TargetKind::StaticExecutable, Locator::Path(PathBuf::from(raw)))
}

/// Does the string look like `[tcp:|udp:]host:port`?
fn is_endpoint(raw: &str) -> bool
{
    let rest = raw
        .strip_prefix("tcp:")
        .or_else(|| raw.strip_prefix("udp:"))
        .unwrap_or(raw);

    let Some((host, port)) = rest.rsplit_once(':') else {
        return false;
    };

    host.len() >= 2 && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())
}

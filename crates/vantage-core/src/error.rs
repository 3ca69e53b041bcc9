//! # Error Types
//!
//! General error handling for the launcher core.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! The taxonomy mirrors the launcher's propagation policy: everything here is
//! fatal to the startup path it occurs on, except that plugin failures are
//! caught at the artifact-loading boundary and reported per plugin instead of
//! being propagated.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for launcher operations
#[derive(Error, Debug)]
pub enum VantageError
{
    /// No live process matched the locator and none could be spawned, or a
    /// remote debug endpoint was unreachable.
    #[error("no such target: {0}")]
    TargetNotFound(String),

    /// An entrypoint token started with a digit but is not a valid integer
    /// literal.
    #[error("malformed entrypoint address `{0}`")]
    MalformedAddress(String),

    /// The target file is not a recognized executable and could not be
    /// interpreted as raw shellcode either.
    #[error("cannot decode `{path}`: {reason}")]
    DecodeFailure
    {
        /// Path of the offending file
        path: PathBuf,
        /// Human-readable description of what went wrong
        reason: String,
    },

    /// A curated artifact (map file, header file) failed to load.
    ///
    /// Unlike plugins, map and header files are assumed to be operator-curated
    /// inputs, so a failure here aborts startup.
    #[error("failed to load {kind} `{path}`: {reason}")]
    ArtifactLoad
    {
        /// What kind of artifact ("map file", "header file")
        kind: &'static str,
        /// Path of the artifact
        path: PathBuf,
        /// Description of the failure
        reason: String,
    },

    /// A CPU identifier was not found in the closed CPU registry.
    ///
    /// Identifiers are looked up in a fixed table, never evaluated as code.
    #[error("unknown CPU `{0}` (known: {known})", known = crate::registry::known_cpus().join(", "))]
    UnknownCpu(String),

    /// An executable-format identifier was not found in the format registry.
    #[error("unknown executable format `{0}` (known: {known})", known = crate::registry::known_formats().join(", "))]
    UnknownFormat(String),

    /// A plugin script or `--eval` hook failed to parse or execute.
    ///
    /// For plugins this is caught per item at the artifact-loading boundary;
    /// for hook strings it is fatal.
    #[error("{source_name}:{line}: {message}")]
    Script
    {
        /// Script file path, or `<eval>` for hook strings
        source_name: String,
        /// 1-based line number
        line: usize,
        /// Description of the failure
        message: String,
    },

    /// The session file is corrupt or an action cannot be replayed.
    #[error("session error: {0}")]
    Session(String),

    /// I/O error (for file operations, sockets, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, VantageError>`
pub type Result<T> = std::result::Result<T, VantageError>;

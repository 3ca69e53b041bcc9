//! # vantage-core
//!
//! Target resolution, analysis backends, and the session action log for the
//! Vantage launcher.
//!
//! This crate turns a free-form target string (`live:1234`, `emu:boot.bin`,
//! `tcp:host:4444`, or a plain file path) into a running analysis session:
//!
//! - [`target`] classifies the string into a backend kind;
//! - [`engine`] builds the matching engine: static disassembly, emulated
//!   execution, remote debug, or live process attach;
//! - [`artifacts`] attaches map files, header prototypes, and plugins, with
//!   per-plugin fault isolation;
//! - [`entrypoint`] types the trailing positional arguments;
//! - [`session`] records and replays the log of user actions so a session
//!   is reproducible across restarts.
//!
//! The disassembler, the emulator's instruction semantics, and the remote
//! wire protocol are collaborators behind the [`engine::Engine`] trait; this
//! crate owns the launch pipeline, not the analysis algorithms.

pub mod analysis;
pub mod artifacts;
pub mod engine;
pub mod engines;
pub mod entrypoint;
pub mod error;
pub mod image;
pub mod options;
pub mod process;
pub mod registry;
pub mod resolver;
pub mod script;
pub mod session;
pub mod target;
pub mod types;

pub use engine::{build_engine, Engine};
// Re-export commonly used types
pub use error::{Result, VantageError};
pub use options::Options;
pub use resolver::{resolve, ResolvedSession};
pub use session::{SessionHandle, UserAction};
pub use target::{classify, TargetKind, TargetSpec};
pub use types::{Address, ProcessId};

//! # Session Log
//!
//! Records and replays the ordered log of user-driven actions so a session
//! is reproducible across process restarts.
//!
//! The log is an append-only sequence of [`UserAction`] values persisted as
//! one JSON object per line. Lifecycle:
//!
//! - no session path → `NoSession`, nothing is recorded;
//! - path given, file absent (or a fresh start requested) → start with an
//!   empty log, any stale file is deleted;
//! - path given, file present → load the log; the caller replays it against
//!   the live engine before recording anything new.
//!
//! On [`SessionHandle::close`] the full log: prior actions plus everything
//! recorded this run: is written back to the same path, overwriting it.
//! Nothing is flushed on abnormal termination, and no file locking is done;
//! concurrent opens of one session file are out of scope.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::Engine;
use crate::entrypoint::Entrypoint;
use crate::error::{Result, VantageError};
use crate::types::Address;

/// One recorded user action.
///
/// Entries are never reordered or mutated once recorded; a fresh start
/// replaces the log wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UserAction
{
    /// Move the view cursor to an address
    FocusAddr
    {
        /// Target address
        addr: u64,
    },
    /// Move the view cursor to a label
    FocusLabel
    {
        /// Label name, resolved through the engine at replay time
        label: String,
    },
    /// Rename the label at an address
    Rename
    {
        /// Annotated address
        addr: u64,
        /// New label name
        name: String,
    },
    /// Attach a comment to an address
    Comment
    {
        /// Annotated address
        addr: u64,
        /// Comment text
        text: String,
    },
    /// Start disassembly at an address
    Disassemble
    {
        /// Root address
        addr: u64,
    },
}

/// Handle on one session file (or on no session at all).
#[derive(Debug)]
pub struct SessionHandle
{
    path: Option<PathBuf>,
    log: Vec<UserAction>,
    resumed: usize,
}

impl SessionHandle
{
    /// Open a session.
    ///
    /// With no path this is the terminal `NoSession` state: recording is a
    /// no-op and `close` writes nothing. With a path, a missing file or
    /// `fresh_start` begins an empty log (deleting any stale file);
    /// otherwise the existing log is loaded for the caller to replay.
    ///
    /// ## Errors
    ///
    /// [`VantageError::Session`] when an existing log cannot be read or a
    /// line fails to parse.
    pub fn open(path: Option<PathBuf>, fresh_start: bool) -> Result<Self>
    {
        let Some(path) = path else {
            return Ok(Self {
                path: None,
                log: Vec::new(),
                resumed: 0,
            });
        };

        if fresh_start || !path.exists() {
            if path.exists() {
                fs::remove_file(&path)
                    .map_err(|err| VantageError::Session(format!("{}: {err}", path.display())))?;
                debug!(path = %path.display(), "discarded previous session");
            }
            return Ok(Self {
                path: Some(path),
                log: Vec::new(),
                resumed: 0,
            });
        }

        let log = load_log(&path)?;
        let resumed = log.len();
        Ok(Self {
            path: Some(path),
            log,
            resumed,
        })
    }

    /// Whether actions are being persisted at all.
    #[must_use]
    pub fn is_active(&self) -> bool
    {
        self.path.is_some()
    }

    /// Number of actions loaded from a resumed session file.
    #[must_use]
    pub fn resumed_len(&self) -> usize
    {
        self.resumed
    }

    /// The full log: resumed actions first, then this run's.
    #[must_use]
    pub fn actions(&self) -> &[UserAction]
    {
        &self.log
    }

    /// Replay the resumed part of the log against the engine, in original
    /// order.
    ///
    /// Replay is deterministic: running it twice from the same log leaves
    /// the engine in the same navigational state.
    ///
    /// ## Errors
    ///
    /// [`VantageError::Session`] when an action cannot be applied (e.g. a
    /// label the engine no longer knows).
    pub fn replay(&self, engine: &mut dyn Engine) -> Result<usize>
    {
        if self.resumed > 0 {
            if let Some(path) = &self.path {
                info!(path = %path.display(), actions = self.resumed, "replaying session");
            }
        }

        for action in &self.log[..self.resumed] {
            apply(engine, action)?;
        }
        Ok(self.resumed)
    }

    /// Append an action to the in-memory log.
    ///
    /// No-op in the `NoSession` state.
    pub fn record(&mut self, action: UserAction)
    {
        if self.path.is_some() {
            self.log.push(action);
        }
    }

    /// Flush the full log back to the session file, overwriting it.
    ///
    /// ## Errors
    ///
    /// [`VantageError::Session`] on write failure.
    pub fn close(self) -> Result<()>
    {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut out = String::new();
        for action in &self.log {
            let line = serde_json::to_string(action)
                .map_err(|err| VantageError::Session(err.to_string()))?;
            out.push_str(&line);
            out.push('\n');
        }

        fs::write(path, out).map_err(|err| VantageError::Session(format!("{}: {err}", path.display())))?;
        info!(path = %path.display(), actions = self.log.len(), "session saved");
        Ok(())
    }
}

/// Apply one action to the engine.
pub fn apply(engine: &mut dyn Engine, action: &UserAction) -> Result<()>
{
    match action {
        UserAction::FocusAddr { addr } => {
            engine.analysis_mut().focus(Address::new(*addr));
        }
        UserAction::FocusLabel { label } => {
            let addr = engine
                .analysis()
                .resolve_label(label)
                .ok_or_else(|| VantageError::Session(format!("cannot replay focus: unknown label `{label}`")))?;
            engine.analysis_mut().focus(addr);
        }
        UserAction::Rename { addr, name } => {
            engine.analysis_mut().rename_label(Address::new(*addr), name);
        }
        UserAction::Comment { addr, text } => {
            engine.analysis_mut().set_comment(Address::new(*addr), text);
        }
        UserAction::Disassemble { addr } => {
            engine.disassemble(&Entrypoint::Address(Address::new(*addr)))?;
        }
    }
    Ok(())
}

fn load_log(path: &Path) -> Result<Vec<UserAction>>
{
    let text = fs::read_to_string(path)
        .map_err(|err| VantageError::Session(format!("{}: {err}", path.display())))?;

    let mut log = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let action: UserAction = serde_json::from_str(line).map_err(|err| {
            VantageError::Session(format!("{}:{}: {err}", path.display(), idx + 1))
        })?;
        log.push(action);
    }
    Ok(log)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::engines::static_dasm::StaticDisassembler;

    fn session_path(dir: &tempfile::TempDir) -> PathBuf
    {
        dir.path().join("t.vantage-session")
    }

    #[test]
    fn test_no_session_records_nothing()
    {
        let mut session = SessionHandle::open(None, false).unwrap();
        assert!(!session.is_active());
        session.record(UserAction::FocusAddr { addr: 0x10 });
        assert!(session.actions().is_empty());
        session.close().unwrap();
    }

    #[test]
    fn test_round_trip_replays_in_order()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = session_path(&dir);

        let mut session = SessionHandle::open(Some(path.clone()), false).unwrap();
        session.record(UserAction::Rename {
            addr: 0x1000,
            name: "start".to_string(),
        });
        session.record(UserAction::FocusLabel {
            label: "start".to_string(),
        });
        session.record(UserAction::Disassemble { addr: 0x1000 });
        session.close().unwrap();

        // Reopen without fresh_start: the log replays before new actions.
        let session = SessionHandle::open(Some(path), false).unwrap();
        assert_eq!(session.resumed_len(), 3);

        let mut engine = StaticDisassembler::empty();
        session.replay(&mut engine).unwrap();
        assert_eq!(engine.analysis().label_at(Address::new(0x1000)), Some("start"));
        assert_eq!(engine.analysis().cursor(), Some(Address::new(0x1000)));
        assert_eq!(engine.analysis().roots().len(), 1);
    }

    #[test]
    fn test_replay_is_idempotent()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = session_path(&dir);

        let mut session = SessionHandle::open(Some(path.clone()), false).unwrap();
        session.record(UserAction::Rename {
            addr: 0x20,
            name: "loop_top".to_string(),
        });
        session.record(UserAction::FocusAddr { addr: 0x20 });
        session.close().unwrap();

        let session = SessionHandle::open(Some(path), false).unwrap();
        let mut engine = StaticDisassembler::empty();
        session.replay(&mut engine).unwrap();
        session.replay(&mut engine).unwrap();

        assert_eq!(engine.analysis().cursor(), Some(Address::new(0x20)));
        assert_eq!(engine.analysis().label_at(Address::new(0x20)), Some("loop_top"));
    }

    #[test]
    fn test_fresh_start_discards_previous_log()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = session_path(&dir);

        let mut session = SessionHandle::open(Some(path.clone()), false).unwrap();
        session.record(UserAction::FocusAddr { addr: 1 });
        session.record(UserAction::FocusAddr { addr: 2 });
        session.close().unwrap();

        let mut session = SessionHandle::open(Some(path.clone()), true).unwrap();
        assert_eq!(session.resumed_len(), 0);
        session.record(UserAction::FocusAddr { addr: 3 });
        session.close().unwrap();

        let session = SessionHandle::open(Some(path), false).unwrap();
        assert_eq!(session.actions(), [UserAction::FocusAddr { addr: 3 }]);
    }

    #[test]
    fn test_corrupt_log_is_session_error()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = session_path(&dir);
        fs::write(&path, "{\"action\":\"focus_addr\",\"addr\":1}\nnot json\n").unwrap();

        let err = SessionHandle::open(Some(path), false).unwrap_err();
        assert!(matches!(err, VantageError::Session(_)));
    }

    #[test]
    fn test_replaying_unknown_label_fails()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = session_path(&dir);
        fs::write(&path, "{\"action\":\"focus_label\",\"label\":\"gone\"}\n").unwrap();

        let session = SessionHandle::open(Some(path), false).unwrap();
        let mut engine = StaticDisassembler::empty();
        assert!(session.replay(&mut engine).is_err());
    }
}

//! # Process Location
//!
//! Finds the live process a `live:` target refers to, either by numeric pid
//! or by a substring filter over running process names, and spawns the named
//! program when nothing matches.
//!
//! Lookup scans procfs; on platforms without `/proc` it simply finds
//! nothing, and the caller falls through to spawning.

use std::fs;
use std::path::PathBuf;
use std::process::{Child, Command};

use tracing::debug;

use crate::error::{Result, VantageError};
use crate::types::ProcessId;

/// A located (or freshly spawned) process.
#[derive(Debug)]
pub struct ProcessInfo
{
    /// Pid of the process
    pub pid: ProcessId,
    /// Path of the main module, when readable
    pub path: Option<PathBuf>,
    /// Short process name
    pub name: String,
    /// Spawn handle when we created the process ourselves; kept so the
    /// child is reaped on teardown
    pub child: Option<Child>,
}

/// Look up a running process by pid.
#[must_use]
pub fn find_by_pid(pid: u32) -> Option<ProcessInfo>
{
    let proc_dir = PathBuf::from(format!("/proc/{pid}"));
    if !proc_dir.exists() {
        return None;
    }

    let name = fs::read_to_string(proc_dir.join("comm"))
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    Some(ProcessInfo {
        pid: ProcessId(pid),
        path: fs::read_link(proc_dir.join("exe")).ok(),
        name,
        child: None,
    })
}

/// Find the first running process whose name or command line contains
/// `filter`.
#[must_use]
pub fn find_by_name(filter: &str) -> Option<ProcessInfo>
{
    let entries = fs::read_dir("/proc").ok()?;

    for entry in entries.flatten() {
        let Ok(pid) = entry.file_name().to_string_lossy().parse::<u32>() else {
            continue;
        };

        let comm = fs::read_to_string(entry.path().join("comm"))
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        let cmdline = fs::read_to_string(entry.path().join("cmdline")).unwrap_or_default();

        if comm.contains(filter) || cmdline.split('\0').next().is_some_and(|arg0| arg0.contains(filter)) {
            debug!(pid, name = %comm, "matched live target by name");
            return Some(ProcessInfo {
                pid: ProcessId(pid),
                path: fs::read_link(entry.path().join("exe")).ok(),
                name: comm,
                child: None,
            });
        }
    }

    None
}

/// Spawn `program` so it can be attached to.
///
/// ## Errors
///
/// [`VantageError::TargetNotFound`] when the program cannot be started.
pub fn spawn(program: &str) -> Result<ProcessInfo>
{
    let child = Command::new(program)
        .spawn()
        .map_err(|err| VantageError::TargetNotFound(format!("{program}: {err}")))?;

    let pid = ProcessId(child.id());
    debug!(pid = pid.0, %program, "spawned live target");

    Ok(ProcessInfo {
        pid,
        path: Some(PathBuf::from(program)),
        name: program.to_string(),
        child: Some(child),
    })
}

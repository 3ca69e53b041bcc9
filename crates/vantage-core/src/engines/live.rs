//! Live process backend.

use std::path::PathBuf;
use std::process::Child;

use tracing::{info, warn};

use crate::analysis::Analysis;
use crate::engine::Engine;
use crate::error::{Result, VantageError};
use crate::process::{self, ProcessInfo};
use crate::target::Locator;
use crate::types::ProcessId;

/// Debugs a running process on the local machine.
///
/// The locator either names a pid directly or is a substring filter over
/// running process names; a filter that matches nothing falls back to
/// spawning the named program. Either way the process is attached before the
/// engine is returned: there is no detached half-built state.
#[derive(Debug)]
pub struct LiveProcessDebugger
{
    analysis: Analysis,
    pid: ProcessId,
    module_path: Option<PathBuf>,
    attached: bool,
    /// Spawn handle when we created the process, kept so it is reaped
    child: Option<Child>,
}

impl LiveProcessDebugger
{
    /// Locate (or spawn) and attach to the process named by `locator`.
    ///
    /// ## Errors
    ///
    /// [`VantageError::TargetNotFound`] when no process matches and the
    /// locator cannot be spawned, or when the attach itself fails.
    pub fn attach_to(locator: &Locator) -> Result<Self>
    {
        let target = match locator {
            Locator::Pid(pid) => process::find_by_pid(*pid)
                .ok_or_else(|| VantageError::TargetNotFound(format!("pid {pid}")))?,
            Locator::ProcessName(filter) => match process::find_by_name(filter) {
                Some(found) => found,
                None => process::spawn(filter)?,
            },
            other => {
                return Err(VantageError::TargetNotFound(format!("not a live target: {other:?}")));
            }
        };

        Self::attach(target)
    }

    fn attach(target: ProcessInfo) -> Result<Self>
    {
        let ProcessInfo { pid, path, name, child } = target;

        attach_ptrace(pid)?;
        info!(pid = pid.0, %name, "attached to live target");

        Ok(Self {
            analysis: Analysis::empty(),
            pid,
            module_path: path,
            attached: true,
            child,
        })
    }

    /// Pid of the debuggee.
    #[must_use]
    pub fn pid(&self) -> ProcessId
    {
        self.pid
    }

    /// Detach from the debuggee.
    pub fn detach(&mut self)
    {
        if self.attached {
            detach_ptrace(self.pid);
            self.attached = false;
        }
    }
}

impl Engine for LiveProcessDebugger
{
    fn describe(&self) -> String
    {
        match &self.module_path {
            Some(path) => format!("{}:{}", self.pid, path.display()),
            None => format!("{}", self.pid),
        }
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

impl Drop for LiveProcessDebugger
{
    fn drop(&mut self)
    {
        self.detach();
        if let Some(child) = self.child.as_mut() {
            if let Err(err) = child.kill() {
                warn!(pid = self.pid.0, %err, "failed to stop spawned target");
            }
            let _ = child.wait();
        }
    }
}

#[cfg(target_os = "linux")]
fn attach_ptrace(pid: ProcessId) -> Result<()>
{
    use nix::sys::ptrace;
    use nix::sys::wait::waitpid;
    use nix::unistd::Pid;

    let nix_pid = Pid::from_raw(pid.0 as i32);
    ptrace::attach(nix_pid).map_err(|err| VantageError::TargetNotFound(format!("pid {}: attach: {err}", pid.0)))?;
    waitpid(nix_pid, None).map_err(|err| VantageError::TargetNotFound(format!("pid {}: wait: {err}", pid.0)))?;
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn attach_ptrace(pid: ProcessId) -> Result<()>
{
    Err(VantageError::TargetNotFound(format!(
        "pid {}: live attach is not supported on {}",
        pid.0,
        std::env::consts::OS
    )))
}

#[cfg(target_os = "linux")]
fn detach_ptrace(pid: ProcessId)
{
    use nix::sys::ptrace;
    use nix::unistd::Pid;

    if let Err(err) = ptrace::detach(Pid::from_raw(pid.0 as i32), None) {
        warn!(pid = pid.0, %err, "ptrace detach failed");
    }
}

#[cfg(not(target_os = "linux"))]
fn detach_ptrace(_pid: ProcessId) {}

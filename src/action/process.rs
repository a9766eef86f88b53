// src/action/process.rs

use std::fmt;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

/// How a watched run process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Code(i32),
    Signal(i32),
    WaitFailed(String),
}

impl ExitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExitOutcome::Success)
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        if status.success() {
            return ExitOutcome::Success;
        }
        match (status.code(), status.signal()) {
            (Some(code), _) => ExitOutcome::Code(code),
            (None, Some(sig)) => ExitOutcome::Signal(sig),
            (None, None) => ExitOutcome::WaitFailed(format!("unknown exit status {status}")),
        }
    }
}

impl From<io::Result<ExitStatus>> for ExitOutcome {
    fn from(res: io::Result<ExitStatus>) -> Self {
        match res {
            Ok(status) => ExitOutcome::from(status),
            Err(err) => ExitOutcome::WaitFailed(err.to_string()),
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Success => f.write_str("exited cleanly"),
            ExitOutcome::Code(code) => write!(f, "exit status {code}"),
            ExitOutcome::Signal(sig) => write!(f, "killed by signal {sig}"),
            ExitOutcome::WaitFailed(err) => write!(f, "wait failed: {err}"),
        }
    }
}

/// Exit notification sent by an action's watch task.
///
/// `generation` identifies which run of the action this was, so a report from
/// a previous run can never be taken for the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildStatus {
    pub action: usize,
    pub generation: u64,
    pub outcome: ExitOutcome,
}

/// A run process that was just signalled by [`super::Action::kill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KilledProcess {
    pub pid: u32,
    pub generation: u64,
}

// src/types.rs

use std::fmt;

use nix::sys::signal::Signal;
use notify::EventKind;
use notify::event::ModifyKind;

/// Kind of a single filesystem change, as reported by the event source.
///
/// Notify reports a richer tree of kinds; everything we don't act on collapses
/// into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Renamed,
    Written,
    Removed,
    Other,
}

impl From<&EventKind> for ChangeKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Renamed,
            EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
                ChangeKind::Written
            }
            EventKind::Remove(_) => ChangeKind::Removed,
            _ => ChangeKind::Other,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Created => "created",
            ChangeKind::Renamed => "renamed",
            ChangeKind::Written => "written",
            ChangeKind::Removed => "removed",
            ChangeKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// Signal used to stop a child process group.
///
/// `Terminate` is the graceful request sent on restarts, `Kill` the forceful
/// follow-up once the grace window has elapsed. `Interrupt` is only forwarded
/// when the supervisor itself was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Terminate,
    Kill,
}

impl StopSignal {
    pub fn as_nix(self) -> Signal {
        match self {
            StopSignal::Interrupt => Signal::SIGINT,
            StopSignal::Terminate => Signal::SIGTERM,
            StopSignal::Kill => Signal::SIGKILL,
        }
    }
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_nix().as_str())
    }
}

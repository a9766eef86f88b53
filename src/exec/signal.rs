// src/exec/signal.rs

//! Process-group signalling.
//!
//! Every child is spawned as the leader of its own group, so `killpg(pid)`
//! (the same as `kill(-pid)`) reaches it and whatever it forked.

use nix::errno::Errno;
use nix::sys::signal::killpg;
use nix::unistd::Pid;
use tracing::debug;

use crate::types::StopSignal;

/// Send `signal` to the process group led by `pid`.
pub fn signal_group(pid: u32, signal: StopSignal) -> Result<(), Errno> {
    let pgid = i32::try_from(pid).map_err(|_| Errno::EINVAL)?;
    if pgid <= 0 {
        // 0 or a negative id would address our own group or every process.
        return Err(Errno::EINVAL);
    }
    debug!(pid, %signal, "signalling process group");
    killpg(Pid::from_raw(pgid), signal.as_nix())
}

/// SIGKILL the group led by `pid`. A group that no longer exists counts as
/// killed.
pub fn force_kill_group(pid: u32) -> Result<(), Errno> {
    match signal_group(pid, StopSignal::Kill) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(e),
    }
}

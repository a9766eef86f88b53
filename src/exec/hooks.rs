// src/exec/hooks.rs

use std::time::Duration;

use tokio::process::Child;
use tokio::time::{Instant, timeout_at};
use tracing::{error, info, warn};

use crate::errors::{DevwatchError, Result};
use crate::exec::{CommandLine, force_kill_group, signal_group};
use crate::types::StopSignal;

/// Launches post-hook commands once and keeps their handles for shutdown.
///
/// Hooks are never watched, restarted or health-checked; the only thing done
/// with a handle after spawning is terminating its process group.
#[derive(Debug)]
pub struct HookRunner {
    hooks: Vec<CommandLine>,
    processes: Vec<Option<Child>>,
}

impl HookRunner {
    pub fn new(hooks: Vec<CommandLine>) -> Self {
        let processes = hooks.iter().map(|_| None).collect();
        Self { hooks, processes }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Spawn every hook. A spawn failure is logged and the remaining hooks
    /// still start.
    pub fn run_all(&mut self) {
        if self.hooks.is_empty() {
            return;
        }

        info!(count = self.hooks.len(), "running post hooks");
        for (slot, hook) in self.processes.iter_mut().zip(&self.hooks) {
            info!(hook = %hook, "starting post hook");
            match hook.command().spawn() {
                Ok(child) => *slot = Some(child),
                Err(err) => error!(hook = %hook, error = %err, "post hook failed to start"),
            }
        }
    }

    /// PIDs of hooks that are still running, in configuration order.
    pub fn live_pids(&mut self) -> Vec<u32> {
        let mut pids = Vec::new();
        for child in self.processes.iter_mut().flatten() {
            if let (Ok(None), Some(pid)) = (child.try_wait(), child.id()) {
                pids.push(pid);
            }
        }
        pids
    }

    /// Signal every live hook group, give them `grace` to exit, then SIGKILL
    /// the rest. A failed SIGKILL or a hook surviving it is an error.
    pub async fn terminate(&mut self, signal: StopSignal, grace: Duration) -> Result<()> {
        for pid in self.live_pids() {
            if let Err(err) = signal_group(pid, signal) {
                warn!(pid, %signal, error = %err, "failed to signal post hook");
            }
        }

        if self.wait_all(Instant::now() + grace).await {
            return Ok(());
        }

        for pid in self.live_pids() {
            warn!(pid, "post hook still running after grace period; killing");
            force_kill_group(pid).map_err(|e| {
                DevwatchError::ShutdownError(format!("failed to kill post hook {pid}: {e}"))
            })?;
        }

        if self.wait_all(Instant::now() + grace).await {
            Ok(())
        } else {
            Err(DevwatchError::ShutdownError(format!(
                "post hooks {:?} survived SIGKILL",
                self.live_pids()
            )))
        }
    }

    /// Reap hooks until all have exited or `deadline` passes. Returns true if
    /// none is left running.
    async fn wait_all(&mut self, deadline: Instant) -> bool {
        let mut all_exited = true;
        for child in self.processes.iter_mut().flatten() {
            if timeout_at(deadline, child.wait()).await.is_err() {
                all_exited = false;
            }
        }
        all_exited
    }
}

// src/action/mod.rs

//! One configured `(pattern, build, run)` triple and its child process.
//!
//! Lifecycle:
//!
//! ```text
//! Idle -> Building -> Running -> (killed | exited) -> Idle
//!                  \-> BuildFailed (until the next trigger)
//! ```
//!
//! The coordinator is the only caller of `exec` and `kill`. At most one run
//! process exists per action: `exec` refuses to start while the previous one
//! is still live, so callers must `kill` and wait for its exit report first.

pub mod pattern;
pub mod process;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ActionSpec;
use crate::exec::{CommandLine, signal_group};
use crate::types::StopSignal;

pub use pattern::ActionPattern;
pub use process::{ChildStatus, ExitOutcome, KilledProcess};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Build failed for '{pattern}': {reason}")]
    BuildFailure { pattern: String, reason: String },

    #[error("Run failed for '{pattern}': {reason}")]
    RunFailure { pattern: String, reason: String },
}

/// Observable state of an action between coordinator steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Idle,
    Running,
    BuildFailed,
}

/// Something a file path can be matched against.
pub trait PathMatcher {
    fn matches(&self, path: &Path) -> bool;
}

impl PathMatcher for ActionPattern {
    fn matches(&self, path: &Path) -> bool {
        ActionPattern::matches(self, path)
    }
}

impl PathMatcher for Action {
    fn matches(&self, path: &Path) -> bool {
        self.pattern.matches(path)
    }
}

/// The live run process of an action.
#[derive(Debug)]
struct RunHandle {
    pid: u32,
    generation: u64,
    /// Present until `watch` moves it into the wait task.
    child: Option<Child>,
    /// Set by the wait task once the exit status has been collected.
    exited: Arc<AtomicBool>,
    waiter: Option<JoinHandle<()>>,
}

impl RunHandle {
    fn has_exited(&mut self) -> bool {
        if self.exited.load(Ordering::Acquire) {
            return true;
        }
        match self.child.as_mut().map(Child::try_wait) {
            Some(Ok(Some(_))) => {
                self.exited.store(true, Ordering::Release);
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct Action {
    index: usize,
    pattern: ActionPattern,
    build: Option<CommandLine>,
    run: Option<CommandLine>,
    process: Option<RunHandle>,
    generation: u64,
    build_failed: bool,
}

impl Action {
    pub fn new(index: usize, spec: &ActionSpec) -> Self {
        Self {
            index,
            pattern: ActionPattern::new(spec.pattern.clone()),
            build: spec.build.clone(),
            run: spec.run.clone(),
            process: None,
            generation: 0,
            build_failed: false,
        }
    }

    /// Position of this action in the configuration.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn pattern(&self) -> &ActionPattern {
        &self.pattern
    }

    pub fn state(&mut self) -> ActionState {
        if self.is_running() {
            ActionState::Running
        } else if self.build_failed {
            ActionState::BuildFailed
        } else {
            ActionState::Idle
        }
    }

    /// True while a run process exists and no exit status has been seen.
    pub fn is_running(&mut self) -> bool {
        match self.process.as_mut() {
            Some(handle) => !handle.has_exited(),
            None => false,
        }
    }

    /// True once `watch` has handed the current run process to a wait task.
    pub fn is_watched(&self) -> bool {
        self.process.as_ref().is_some_and(|h| h.waiter.is_some())
    }

    /// PID of the live run process, if any.
    pub fn pid(&mut self) -> Option<u32> {
        let handle = self.process.as_mut()?;
        if handle.has_exited() {
            None
        } else {
            Some(handle.pid)
        }
    }

    /// Build (blocking until the build exits) and then start the run command.
    ///
    /// A failed build skips the run step. Empty commands are skipped.
    pub async fn exec(&mut self) -> Result<(), ActionError> {
        if let Some(pid) = self.pid() {
            return Err(self.run_failure(format!("previous run (pid {pid}) is still alive")));
        }
        self.process = None;

        if let Some(build) = self.build.clone() {
            self.build_failed = true;
            self.build_step(&build).await?;
            self.build_failed = false;
        }

        if let Some(run) = self.run.clone() {
            self.run_step(&run)?;
        }

        Ok(())
    }

    async fn build_step(&self, build: &CommandLine) -> Result<(), ActionError> {
        info!(action = self.index, pattern = %self.pattern, cmd = %build, "building");

        let status = build.command().status().await.map_err(|e| ActionError::BuildFailure {
            pattern: self.pattern.to_string(),
            reason: format!("could not start '{build}': {e}"),
        })?;

        if !status.success() {
            return Err(ActionError::BuildFailure {
                pattern: self.pattern.to_string(),
                reason: ExitOutcome::from(status).to_string(),
            });
        }

        debug!(action = self.index, "build finished");
        Ok(())
    }

    fn run_step(&mut self, run: &CommandLine) -> Result<(), ActionError> {
        info!(action = self.index, pattern = %self.pattern, cmd = %run, "running");

        let child = run
            .command()
            .spawn()
            .map_err(|e| self.run_failure(format!("could not start '{run}': {e}")))?;

        let Some(pid) = child.id() else {
            return Err(self.run_failure(format!("'{run}' exited before its pid was read")));
        };

        self.generation += 1;
        self.process = Some(RunHandle {
            pid,
            generation: self.generation,
            child: Some(child),
            exited: Arc::new(AtomicBool::new(false)),
            waiter: None,
        });

        debug!(action = self.index, pid, generation = self.generation, "run process started");
        Ok(())
    }

    fn run_failure(&self, reason: String) -> ActionError {
        ActionError::RunFailure {
            pattern: self.pattern.to_string(),
            reason,
        }
    }

    /// Signal the run process group.
    ///
    /// Returns the signalled process when a live one existed and the signal
    /// was delivered; the handle is then cleared and the caller should wait
    /// for its [`ChildStatus`]. Returns `None` if nothing was running (judged
    /// by the collected exit status, never by probing the pid) or delivery
    /// failed.
    pub fn kill(&mut self, signal: StopSignal) -> Option<KilledProcess> {
        let handle = self.process.as_mut()?;
        if handle.has_exited() {
            self.process = None;
            return None;
        }

        match signal_group(handle.pid, signal) {
            Ok(()) => {
                let killed = KilledProcess {
                    pid: handle.pid,
                    generation: handle.generation,
                };
                self.process = None;
                Some(killed)
            }
            Err(err) => {
                warn!(
                    action = self.index,
                    pid = handle.pid,
                    %signal,
                    error = %err,
                    "failed to signal run process group"
                );
                None
            }
        }
    }

    /// Spawn the task that waits for the current run process and reports its
    /// exit on `status_tx`.
    ///
    /// Does nothing (and returns false) when there is no run process or it is
    /// already being watched.
    pub fn watch(&mut self, status_tx: mpsc::UnboundedSender<ChildStatus>) -> bool {
        let Some(handle) = self.process.as_mut() else {
            return false;
        };
        let Some(mut child) = handle.child.take() else {
            return false;
        };

        let exited = Arc::clone(&handle.exited);
        let action = self.index;
        let generation = handle.generation;

        handle.waiter = Some(tokio::spawn(async move {
            let outcome = ExitOutcome::from(child.wait().await);
            exited.store(true, Ordering::Release);
            debug!(action, generation, %outcome, "run process exited");
            let _ = status_tx.send(ChildStatus {
                action,
                generation,
                outcome,
            });
        }));

        true
    }
}

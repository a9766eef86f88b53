// src/engine/coordinator.rs

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, error, info, warn};

use crate::action::{Action, ChildStatus, KilledProcess};
use crate::config::ConfigFile;
use crate::engine::dispatch::select_actions;
use crate::engine::interrupts::Interrupts;
use crate::errors::{DevwatchError, Result};
use crate::exec::{HookRunner, force_kill_group};
use crate::fs::FileSystem;
use crate::types::StopSignal;
use crate::watch::{
    Batch, EventBatcher, EventSource, RawEvent, SourceStreams, WatchError, collect_watch_dirs,
    register_watch_set,
};

/// The single dispatcher.
///
/// Owns the actions, the event batcher (and through it the event source), the
/// post-hook processes, the exit-status channel and the signal subscription.
/// Only this loop mutates actions, so per-action process state needs no
/// locking.
pub struct Coordinator {
    actions: Vec<Action>,
    batcher: Option<EventBatcher>,
    watch_errors: mpsc::UnboundedReceiver<WatchError>,
    status_tx: mpsc::UnboundedSender<ChildStatus>,
    status_rx: mpsc::UnboundedReceiver<ChildStatus>,
    hooks: HookRunner,
    interrupts: Interrupts,
    fs: Arc<dyn FileSystem>,
    watched_dirs: Vec<PathBuf>,
    debug: bool,
    grace_period: Duration,
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("actions", &self.actions.len())
            .field("hooks", &self.hooks.len())
            .field("watched_dirs", &self.watched_dirs.len())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    /// Walk `root`, register every directory with `source`, and start the
    /// batcher on top of it.
    ///
    /// Must be called inside a Tokio runtime. Walk and registration failures
    /// are returned; nothing has been spawned apart from the batcher task
    /// when this succeeds.
    pub fn new<S: EventSource>(
        cfg: &ConfigFile,
        root: &Path,
        mut source: S,
        streams: SourceStreams,
        fs: Arc<dyn FileSystem>,
        interrupts: Interrupts,
    ) -> Result<Self> {
        let watched_dirs = collect_watch_dirs(fs.as_ref(), root, cfg.exclude_set())?;
        if cfg.debug {
            for dir in &watched_dirs {
                info!(dir = %dir.display(), "watching");
            }
        }
        register_watch_set(&mut source, &watched_dirs)?;
        info!(dirs = watched_dirs.len(), root = %root.display(), "file watcher ready");

        let batcher = EventBatcher::spawn(source, streams.events);
        let (status_tx, status_rx) = mpsc::unbounded_channel();

        Ok(Self {
            actions: cfg
                .actions
                .iter()
                .enumerate()
                .map(|(i, spec)| Action::new(i, spec))
                .collect(),
            batcher: Some(batcher),
            watch_errors: streams.errors,
            status_tx,
            status_rx,
            hooks: HookRunner::new(cfg.post_hooks.clone()),
            interrupts,
            fs,
            watched_dirs,
            debug: cfg.debug,
            grace_period: cfg.grace_period,
        })
    }

    pub fn watched_dirs(&self) -> &[PathBuf] {
        &self.watched_dirs
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Run every action once, start the post hooks, then dispatch until a stop
    /// signal arrives. Returns after every child has been stopped.
    pub async fn run(mut self) -> Result<()> {
        self.run_actions(None).await;
        self.hooks.run_all();

        loop {
            tokio::select! {
                batch = next_batch(&mut self.batcher) => match batch {
                    Some(batch) => self.handle_batch(batch).await,
                    None => {
                        error!("event batcher stopped unexpectedly");
                        self.shutdown(StopSignal::Terminate).await?;
                        return Err(DevwatchError::ShutdownError(
                            "event batcher stopped unexpectedly".to_string(),
                        ));
                    }
                },
                Some(err) = self.watch_errors.recv() => {
                    warn!(error = %err, "file watch error");
                }
                Some(status) = self.status_rx.recv() => {
                    self.handle_child_status(status);
                }
                signal = self.interrupts.recv() => {
                    let signal = signal.unwrap_or(StopSignal::Terminate);
                    info!(%signal, "stop requested");
                    return self.shutdown(signal).await;
                }
            }
        }
    }

    async fn handle_batch(&mut self, batch: Batch) {
        for event in &batch {
            if self.debug {
                info!(kind = %event.kind, path = %event.path.display(), "file event");
            }
            // Racy by nature: the path may be gone by the time we look.
            if self.fs.is_dir(&event.path) {
                self.handle_dir_event(event);
            }
        }

        self.run_actions(Some(&batch)).await;
    }

    /// New directories are not added to the watch set after startup.
    fn handle_dir_event(&self, event: &RawEvent) {
        debug!(
            path = %event.path.display(),
            kind = %event.kind,
            "directory event; watch set is fixed at startup"
        );
    }

    /// Restart the actions selected by `batch` (all of them for `None`), in
    /// configuration order.
    ///
    /// Each selected action's previous run is stopped and its exit confirmed
    /// before the action is rebuilt. The first failing action ends the pass.
    pub async fn run_actions(&mut self, batch: Option<&[RawEvent]>) {
        let selected = select_actions(&self.actions, batch);
        if selected.is_empty() {
            return;
        }
        debug!(?selected, "actions selected");

        for idx in selected {
            self.stop_action(idx, StopSignal::Terminate).await;

            let action = &mut self.actions[idx];
            if let Err(err) = action.exec().await {
                error!(
                    action = idx,
                    error = %err,
                    "action failed, waiting for file changes to retry"
                );
                break;
            }

            action.watch(self.status_tx.clone());
        }
    }

    /// Signal the action's run process and wait for its exit report,
    /// escalating to SIGKILL after the grace period. Returns true if a process
    /// was stopped and its exit observed.
    async fn stop_action(&mut self, idx: usize, signal: StopSignal) -> bool {
        let Some(killed) = self.actions[idx].kill(signal) else {
            return false;
        };
        debug!(action = idx, pid = killed.pid, %signal, "waiting for run process to exit");

        if let Ok(confirmed) = timeout(self.grace_period, self.wait_for_exit(idx, killed)).await {
            return confirmed;
        }

        warn!(
            action = idx,
            pid = killed.pid,
            grace_ms = self.grace_period.as_millis() as u64,
            "run process ignored {signal}; sending SIGKILL"
        );
        if let Err(err) = force_kill_group(killed.pid) {
            error!(action = idx, pid = killed.pid, error = %err, "failed to kill run process");
            return false;
        }
        self.wait_for_exit(idx, killed).await
    }

    /// Block on the shared status channel until `killed`'s exit arrives.
    /// Reports for other runs received meanwhile are handled normally.
    async fn wait_for_exit(&mut self, idx: usize, killed: KilledProcess) -> bool {
        while let Some(status) = self.status_rx.recv().await {
            if status.action == idx && status.generation == killed.generation {
                if self.debug {
                    info!(action = idx, pid = killed.pid, outcome = %status.outcome, "run process stopped");
                }
                return true;
            }
            self.handle_child_status(status);
        }
        false
    }

    fn handle_child_status(&self, status: ChildStatus) {
        let pattern = self
            .actions
            .get(status.action)
            .map(|a| a.pattern().as_str())
            .unwrap_or("?");

        if status.outcome.is_success() {
            if self.debug {
                info!(action = status.action, pattern, "program exited cleanly");
            }
        } else {
            warn!(
                action = status.action,
                pattern,
                outcome = %status.outcome,
                "program crashed, waiting for file changes"
            );
        }
    }

    /// Forward `signal` to every live action and hook group, SIGKILL whatever
    /// outlives the grace period, then release the event source.
    ///
    /// A process that cannot be SIGKILLed is an error.
    pub async fn shutdown(mut self, signal: StopSignal) -> Result<()> {
        let mut pending: BTreeMap<usize, KilledProcess> = BTreeMap::new();
        for (idx, action) in self.actions.iter_mut().enumerate() {
            if let Some(killed) = action.kill(signal) {
                pending.insert(idx, killed);
            }
        }

        let deadline = Instant::now() + self.grace_period;
        self.collect_exits(&mut pending, deadline).await;

        if !pending.is_empty() {
            for (idx, killed) in &pending {
                warn!(action = idx, pid = killed.pid, "run process still alive; sending SIGKILL");
                force_kill_group(killed.pid).map_err(|e| {
                    DevwatchError::ShutdownError(format!(
                        "failed to kill run process {} of action {idx}: {e}",
                        killed.pid
                    ))
                })?;
            }
            let deadline = Instant::now() + self.grace_period;
            self.collect_exits(&mut pending, deadline).await;
            if !pending.is_empty() {
                return Err(DevwatchError::ShutdownError(format!(
                    "run processes of actions {:?} survived SIGKILL",
                    pending.keys().collect::<Vec<_>>()
                )));
            }
        }

        self.hooks.terminate(signal, self.grace_period).await?;

        if let Some(batcher) = self.batcher.take() {
            batcher.close().await;
        }

        info!("all processes stopped");
        Ok(())
    }

    async fn collect_exits(
        &mut self,
        pending: &mut BTreeMap<usize, KilledProcess>,
        deadline: Instant,
    ) {
        while !pending.is_empty() {
            let status = match timeout_at(deadline, self.status_rx.recv()).await {
                Ok(Some(status)) => status,
                Ok(None) | Err(_) => return,
            };
            match pending.get(&status.action) {
                Some(killed) if killed.generation == status.generation => {
                    pending.remove(&status.action);
                }
                _ => self.handle_child_status(status),
            }
        }
    }
}

/// Next batch, or pending forever once the batcher has been closed.
async fn next_batch(batcher: &mut Option<EventBatcher>) -> Option<Batch> {
    match batcher {
        Some(b) => b.next_batch().await,
        None => std::future::pending().await,
    }
}

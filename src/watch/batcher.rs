// src/watch/batcher.rs

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, trace};

use crate::watch::source::{EventSource, RawEvent};

/// Width of one batching window.
pub const BATCH_INTERVAL: Duration = Duration::from_millis(50);

/// Raw events collected during one window, in arrival order. Never empty.
pub type Batch = Vec<RawEvent>;

/// Coalesces a burst of raw events into one batch per tick.
///
/// Owns the event source for its whole lifetime: the background task holds it
/// and closes it when the batcher is closed or dropped. There is no restart;
/// build a new batcher instead.
#[derive(Debug)]
pub struct EventBatcher {
    batches: mpsc::Receiver<Batch>,
    close_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl EventBatcher {
    pub fn spawn<S: EventSource>(source: S, events: mpsc::UnboundedReceiver<RawEvent>) -> Self {
        Self::with_interval(source, events, BATCH_INTERVAL)
    }

    pub fn with_interval<S: EventSource>(
        source: S,
        events: mpsc::UnboundedReceiver<RawEvent>,
        window: Duration,
    ) -> Self {
        let (batch_tx, batches) = mpsc::channel::<Batch>(1);
        let (close_tx, close_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(batch_loop(source, events, batch_tx, close_rx, window));

        Self {
            batches,
            close_tx,
            handle,
        }
    }

    /// Next non-empty batch. `None` once the background task has stopped.
    pub async fn next_batch(&mut self) -> Option<Batch> {
        self.batches.recv().await
    }

    /// Stop the background task and release the event source.
    pub async fn close(self) {
        let _ = self.close_tx.send(());
        if let Err(err) = self.handle.await {
            debug!(error = %err, "batcher task ended abnormally");
        }
    }
}

async fn batch_loop<S: EventSource>(
    source: S,
    mut events: mpsc::UnboundedReceiver<RawEvent>,
    batch_tx: mpsc::Sender<Batch>,
    mut close_rx: oneshot::Receiver<()>,
    window: Duration,
) {
    let mut ticker = interval_at(Instant::now() + window, window);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut pending: Batch = Vec::new();
    let mut source_open = true;

    loop {
        // The tick is checked before the event stream so a steady stream of
        // events cannot hold a batch back past its window.
        tokio::select! {
            biased;

            _ = &mut close_rx => break,

            _ = ticker.tick() => {
                // Take what was already queued when the window closed, and no
                // more, so the drain is bounded.
                for _ in 0..events.len() {
                    match events.try_recv() {
                        Ok(event) => pending.push(event),
                        Err(_) => break,
                    }
                }
                if pending.is_empty() {
                    continue;
                }
                let batch = std::mem::take(&mut pending);
                trace!(len = batch.len(), "emitting batch");
                tokio::select! {
                    biased;
                    _ = &mut close_rx => break,
                    res = batch_tx.send(batch) => {
                        if res.is_err() {
                            debug!("batch receiver dropped");
                            break;
                        }
                    }
                }
            }

            maybe = events.recv(), if source_open => match maybe {
                Some(event) => {
                    trace!(path = %event.path.display(), kind = %event.kind, "raw event");
                    pending.push(event);
                }
                None => {
                    debug!("raw event stream ended");
                    source_open = false;
                }
            },
        }
    }

    source.close();
    debug!("event batcher stopped");
}

// src/watch/source.rs

use std::path::{Path, PathBuf};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::debug;

use crate::errors::Result;
use crate::types::ChangeKind;

/// Error reported by the underlying notification primitive.
pub type WatchError = notify::Error;

/// One changed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl RawEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Receiving ends of an event source: changes and I/O errors arrive on
/// separate streams.
#[derive(Debug)]
pub struct SourceStreams {
    pub events: mpsc::UnboundedReceiver<RawEvent>,
    pub errors: mpsc::UnboundedReceiver<WatchError>,
}

/// Producer of raw change events for a set of watched directories.
///
/// Each directory is watched on its own (non-recursively). `close` consumes
/// the source, so it can only happen once.
pub trait EventSource: Send + 'static {
    fn add_watch(&mut self, path: &Path) -> Result<()>;

    fn close(self);
}

/// [`EventSource`] backed by `notify`'s platform watcher.
pub struct NotifySource {
    watcher: RecommendedWatcher,
    watched: Vec<PathBuf>,
}

impl std::fmt::Debug for NotifySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifySource")
            .field("watched", &self.watched)
            .finish_non_exhaustive()
    }
}

impl NotifySource {
    pub fn new() -> Result<(Self, SourceStreams)> {
        let (event_tx, event_rx) = mpsc::unbounded_channel::<RawEvent>();
        let (error_tx, error_rx) = mpsc::unbounded_channel::<WatchError>();

        // Called synchronously on notify's own thread.
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    // Opens and closes are not changes.
                    if matches!(event.kind, EventKind::Access(_)) {
                        return;
                    }
                    let kind = ChangeKind::from(&event.kind);
                    for path in event.paths {
                        let _ = event_tx.send(RawEvent { path, kind });
                    }
                }
                Err(err) => {
                    let _ = error_tx.send(err);
                }
            },
            Config::default(),
        )?;

        let streams = SourceStreams {
            events: event_rx,
            errors: error_rx,
        };
        Ok((
            Self {
                watcher,
                watched: Vec::new(),
            },
            streams,
        ))
    }

    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }
}

impl EventSource for NotifySource {
    fn add_watch(&mut self, path: &Path) -> Result<()> {
        self.watcher.watch(path, RecursiveMode::NonRecursive)?;
        self.watched.push(path.to_path_buf());
        Ok(())
    }

    fn close(mut self) {
        for path in std::mem::take(&mut self.watched) {
            if let Err(err) = self.watcher.unwatch(&path) {
                debug!(path = %path.display(), error = %err, "unwatch failed during close");
            }
        }
        debug!("event source closed");
    }
}

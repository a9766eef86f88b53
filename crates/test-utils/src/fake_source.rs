use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use devwatch::errors::{DevwatchError, Result};
use devwatch::types::ChangeKind;
use devwatch::watch::{EventSource, RawEvent, SourceStreams, WatchError};

/// Event source driven by the test instead of the OS.
pub struct FakeEventSource {
    watched: Arc<Mutex<Vec<PathBuf>>>,
    closed: Arc<AtomicBool>,
    fail_on: Option<PathBuf>,
}

/// Test-side handle of a [`FakeEventSource`].
#[derive(Clone)]
pub struct FakeSourceHandle {
    pub events: mpsc::UnboundedSender<RawEvent>,
    pub errors: mpsc::UnboundedSender<WatchError>,
    watched: Arc<Mutex<Vec<PathBuf>>>,
    closed: Arc<AtomicBool>,
}

impl FakeSourceHandle {
    pub fn emit(&self, path: impl Into<PathBuf>, kind: ChangeKind) {
        self.events
            .send(RawEvent::new(path, kind))
            .expect("batcher dropped its event stream");
    }

    pub fn write(&self, path: impl Into<PathBuf>) {
        self.emit(path, ChangeKind::Written);
    }

    pub fn error(&self, msg: &str) {
        let _ = self.errors.send(WatchError::generic(msg));
    }

    pub fn watched(&self) -> Vec<PathBuf> {
        self.watched.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

pub fn fake_source() -> (FakeEventSource, SourceStreams, FakeSourceHandle) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (error_tx, error_rx) = mpsc::unbounded_channel();
    let watched = Arc::new(Mutex::new(Vec::new()));
    let closed = Arc::new(AtomicBool::new(false));

    let source = FakeEventSource {
        watched: Arc::clone(&watched),
        closed: Arc::clone(&closed),
        fail_on: None,
    };
    let handle = FakeSourceHandle {
        events: event_tx,
        errors: error_tx,
        watched,
        closed,
    };
    let streams = SourceStreams {
        events: event_rx,
        errors: error_rx,
    };
    (source, streams, handle)
}

impl FakeEventSource {
    /// Make `add_watch` fail for this directory.
    pub fn fail_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_on = Some(path.into());
        self
    }
}

impl EventSource for FakeEventSource {
    fn add_watch(&mut self, path: &Path) -> Result<()> {
        if self.fail_on.as_deref() == Some(path) {
            return Err(DevwatchError::WatchError(WatchError::generic("watch limit reached")));
        }
        self.watched.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn close(self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

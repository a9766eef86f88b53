// src/engine/interrupts.rs

use std::io;

use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio::sync::mpsc;

use crate::types::StopSignal;

/// Stream of shutdown requests owned by the coordinator.
///
/// Production code subscribes to SIGINT and SIGTERM; tests feed a channel so
/// several coordinators can live in one process.
#[derive(Debug)]
pub struct Interrupts {
    inner: Inner,
}

#[derive(Debug)]
enum Inner {
    Os { interrupt: Signal, terminate: Signal },
    Channel(mpsc::Receiver<StopSignal>),
}

impl Interrupts {
    /// Subscribe to the process's SIGINT and SIGTERM.
    pub fn os() -> io::Result<Self> {
        Ok(Self {
            inner: Inner::Os {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
            },
        })
    }

    pub fn channel() -> (mpsc::Sender<StopSignal>, Self) {
        let (tx, rx) = mpsc::channel(4);
        (
            tx,
            Self {
                inner: Inner::Channel(rx),
            },
        )
    }

    /// The next requested stop signal, or `None` when no more can arrive.
    pub async fn recv(&mut self) -> Option<StopSignal> {
        match &mut self.inner {
            Inner::Os {
                interrupt,
                terminate,
            } => {
                tokio::select! {
                    Some(()) = interrupt.recv() => Some(StopSignal::Interrupt),
                    Some(()) = terminate.recv() => Some(StopSignal::Terminate),
                    else => None,
                }
            }
            Inner::Channel(rx) => rx.recv().await,
        }
    }
}

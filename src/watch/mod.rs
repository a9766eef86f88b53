// src/watch/mod.rs

//! File watching.
//!
//! - [`source`]: the raw event source (`notify` in production) behind the
//!   [`EventSource`] trait.
//! - [`batcher`]: coalesces raw events into fixed-interval batches.
//! - [`walk`]: builds the initial set of watched directories.
//!
//! Nothing here knows about actions; it only turns filesystem activity into
//! batches of [`RawEvent`]s.

pub mod batcher;
pub mod source;
pub mod walk;

pub use batcher::{BATCH_INTERVAL, Batch, EventBatcher};
pub use source::{EventSource, NotifySource, RawEvent, SourceStreams, WatchError};
pub use walk::{collect_watch_dirs, register_watch_set};

// src/engine/mod.rs

//! Orchestration engine for devwatch.
//!
//! The coordinator is a single dispatcher loop reacting to:
//! - batches of file changes (restart matching actions)
//! - watcher I/O errors (logged)
//! - run-process exit reports (logged, never restarted)
//! - interrupt signals (stop everything and return)
//!
//! Deciding *which* actions a batch selects is pure and lives in [`dispatch`];
//! signal subscription is an owned value in [`interrupts`].

pub mod coordinator;
pub mod dispatch;
pub mod interrupts;

pub use coordinator::Coordinator;
pub use dispatch::select_actions;
pub use interrupts::Interrupts;

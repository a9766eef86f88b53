// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] turns a configured command string into an argument vector and
//!   spawns it in its own process group with inherited stdio.
//! - [`signal`] signals whole process groups.
//! - [`hooks`] owns the fire-and-forget post-hook processes.

pub mod command;
pub mod hooks;
pub mod signal;

pub use command::CommandLine;
pub use hooks::HookRunner;
pub use signal::{force_kill_group, signal_group};

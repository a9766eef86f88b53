// src/config/mod.rs

//! Configuration loading and validation for devwatch.
//!
//! Responsibilities:
//! - Define the serde-backed data model (`model.rs`).
//! - Load a config file from disk, JSON or TOML (`loader.rs`).
//! - Validate it and derive argument vectors once (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    ConfigFormat, default_config_path, load_and_validate, load_from_path, load_with_fs, parse_str,
};
pub use model::{ActionConfig, ActionSpec, ConfigFile, DEFAULT_GRACE_PERIOD_MS, RawConfigFile};

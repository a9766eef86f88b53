// src/config/model.rs

use std::time::Duration;

use globset::GlobSet;
use serde::Deserialize;

use crate::exec::CommandLine;

pub const DEFAULT_GRACE_PERIOD_MS: u64 = 2000;

/// Top-level configuration exactly as written on disk.
///
/// ```json
/// {
///   "actions": [
///     { "pattern": "*.go", "build": "go build -o app", "run": "./app" }
///   ],
///   "debug": true,
///   "postHooks": ["npm run watch-css"]
/// }
/// ```
///
/// Every field is optional. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfigFile {
    #[serde(default)]
    pub actions: Vec<ActionConfig>,

    /// Log every filesystem event and kill confirmation.
    #[serde(default)]
    pub debug: bool,

    /// Commands started once at startup and only stopped at shutdown.
    #[serde(default)]
    pub post_hooks: Vec<String>,

    /// How long a process group gets between SIGTERM and SIGKILL.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// Directory base names (globs) skipped when building the watch set.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_grace_period_ms() -> u64 {
    DEFAULT_GRACE_PERIOD_MS
}

impl Default for RawConfigFile {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
            debug: false,
            post_hooks: Vec::new(),
            grace_period_ms: default_grace_period_ms(),
            exclude: Vec::new(),
        }
    }
}

/// One `{pattern, build, run}` entry. Empty commands mean "skip this step".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionConfig {
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub build: String,
    #[serde(default)]
    pub run: String,
}

/// Validated action definition with commands already split into argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    pub pattern: String,
    pub build: Option<CommandLine>,
    pub run: Option<CommandLine>,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// holding one means the hooks are non-empty and the exclude globs compiled.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub actions: Vec<ActionSpec>,
    pub debug: bool,
    pub post_hooks: Vec<CommandLine>,
    pub grace_period: Duration,
    pub exclude: Vec<String>,
    exclude_set: GlobSet,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        actions: Vec<ActionSpec>,
        debug: bool,
        post_hooks: Vec<CommandLine>,
        grace_period: Duration,
        exclude: Vec<String>,
        exclude_set: GlobSet,
    ) -> Self {
        Self {
            actions,
            debug,
            post_hooks,
            grace_period,
            exclude,
            exclude_set,
        }
    }

    /// Compiled `exclude` globs, matched against directory base names.
    pub fn exclude_set(&self) -> &GlobSet {
        &self.exclude_set
    }
}

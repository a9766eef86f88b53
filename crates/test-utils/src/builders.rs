#![allow(dead_code)]

use devwatch::config::{ActionConfig, ConfigFile, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_action(mut self, pattern: &str, build: &str, run: &str) -> Self {
        self.config.actions.push(ActionConfig {
            pattern: pattern.to_string(),
            build: build.to_string(),
            run: run.to_string(),
        });
        self
    }

    pub fn with_post_hook(mut self, cmd: &str) -> Self {
        self.config.post_hooks.push(cmd.to_string());
        self
    }

    pub fn with_exclude(mut self, pattern: &str) -> Self {
        self.config.exclude.push(pattern.to_string());
        self
    }

    pub fn debug(mut self, val: bool) -> Self {
        self.config.debug = val;
        self
    }

    pub fn grace_period_ms(mut self, ms: u64) -> Self {
        self.config.grace_period_ms = ms;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// src/config/validate.rs

use std::time::Duration;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::config::model::{ActionSpec, ConfigFile, RawConfigFile};
use crate::errors::{DevwatchError, Result};
use crate::exec::CommandLine;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DevwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        if raw.grace_period_ms == 0 {
            return Err(DevwatchError::ConfigError(
                "gracePeriodMs must be >= 1 (got 0)".to_string(),
            ));
        }

        let post_hooks = validate_post_hooks(&raw.post_hooks)?;
        let exclude_set = build_exclude_set(&raw.exclude)?;

        let actions = raw
            .actions
            .into_iter()
            .map(|a| ActionSpec {
                pattern: a.pattern,
                build: CommandLine::parse(&a.build),
                run: CommandLine::parse(&a.run),
            })
            .collect();

        Ok(ConfigFile::new_unchecked(
            actions,
            raw.debug,
            post_hooks,
            Duration::from_millis(raw.grace_period_ms),
            raw.exclude,
            exclude_set,
        ))
    }
}

fn validate_post_hooks(hooks: &[String]) -> Result<Vec<CommandLine>> {
    hooks
        .iter()
        .enumerate()
        .map(|(i, hook)| {
            CommandLine::parse(hook).ok_or_else(|| {
                DevwatchError::ConfigError(format!("postHooks[{i}] is an empty command"))
            })
        })
        .collect()
}

fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                DevwatchError::ConfigError(format!("invalid exclude pattern '{pat}': {e}"))
            })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| DevwatchError::ConfigError(format!("building exclude set: {e}")))
}

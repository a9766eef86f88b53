// src/config/loader.rs

use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};

/// On-disk format of a config file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// `.toml` selects TOML; anything else (including no extension) is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Deserialize a config document without validating it.
pub fn parse_str(contents: &str, format: ConfigFormat) -> Result<RawConfigFile> {
    let raw = match format {
        ConfigFormat::Json => serde_json::from_str(contents)?,
        ConfigFormat::Toml => toml::from_str(contents)?,
    };
    Ok(raw)
}

/// Load a configuration file from a given path and return the raw model.
///
/// This only performs deserialization. Use [`load_and_validate`] to also get
/// argument vectors and compiled exclude globs.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    load_with_fs(&RealFileSystem, path.as_ref())
}

/// Like [`load_from_path`], reading through `fs`.
pub fn load_with_fs(fs: &dyn FileSystem, path: &Path) -> Result<RawConfigFile> {
    let contents = fs.read_to_string(path)?;
    parse_str(&contents, ConfigFormat::from_path(path))
}

/// Load a configuration file from path and validate it.
///
/// This is the entry point the rest of the application uses.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw = load_from_path(path)?;
    ConfigFile::try_from(raw)
}

/// `.devwatch.json` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(".devwatch.json")
}

// src/action/pattern.rs

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};
use tracing::warn;

/// Shell-style glob matched against the final component of a path.
///
/// `*`, `?` and `[...]` behave as in a shell; matching is case-sensitive and
/// directory components of the path are ignored. A pattern that fails to
/// compile is kept and reported every time it is used.
#[derive(Clone)]
pub struct ActionPattern {
    raw: String,
    matcher: Result<GlobMatcher, globset::Error>,
}

impl fmt::Debug for ActionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionPattern")
            .field("raw", &self.raw)
            .field("valid", &self.matcher.is_ok())
            .finish()
    }
}

impl ActionPattern {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let matcher = GlobBuilder::new(&raw)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map(|glob| glob.compile_matcher());
        Self { raw, matcher }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match without logging; a malformed pattern is returned as an error.
    pub fn try_matches(&self, path: &Path) -> Result<bool, globset::Error> {
        let name = path.file_name().unwrap_or(OsStr::new(""));
        match &self.matcher {
            Ok(matcher) => Ok(matcher.is_match(Path::new(name))),
            Err(err) => Err(err.clone()),
        }
    }

    /// Match the base name of `path`. Malformed patterns log and never match.
    pub fn matches(&self, path: &Path) -> bool {
        match self.try_matches(path) {
            Ok(matched) => matched,
            Err(err) => {
                warn!(pattern = %self.raw, error = %err, "invalid action pattern");
                false
            }
        }
    }
}

impl fmt::Display for ActionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// src/watch/walk.rs

use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::GlobSet;
use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::watch::source::EventSource;

/// Recursively collect `root` and every directory below it, parents before
/// children, siblings in lexical order.
///
/// Directories whose base name matches `exclude` are skipped along with their
/// subtree. Symlinked directories are neither watched nor followed. `root`
/// itself is always included. Any unreadable directory fails the whole walk.
pub fn collect_watch_dirs(
    fs: &dyn FileSystem,
    root: &Path,
    exclude: &GlobSet,
) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let mut children: Vec<PathBuf> = fs
            .read_dir(&dir)
            .with_context(|| format!("walking directory {dir:?}"))?
            .into_iter()
            // Links are never followed: `up -> ..` would otherwise loop.
            .filter(|p| !fs.is_symlink(p) && fs.is_dir(p))
            .filter(|p| match p.file_name() {
                Some(name) if exclude.is_match(name) => {
                    debug!(path = %p.display(), "skipping excluded directory");
                    false
                }
                _ => true,
            })
            .collect();
        children.sort();

        dirs.push(dir);
        // Reverse so the stack pops children in lexical order.
        stack.extend(children.into_iter().rev());
    }

    Ok(dirs)
}

/// Register every directory with the event source. The first failure aborts.
pub fn register_watch_set<S: EventSource>(source: &mut S, dirs: &[PathBuf]) -> Result<()> {
    for dir in dirs {
        source
            .add_watch(dir)
            .map_err(|e| anyhow::anyhow!("watching {dir:?}: {e}"))?;
    }
    Ok(())
}

// src/fs/mock.rs

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::FileSystem;

#[derive(Debug, Clone)]
enum MockEntry {
    File(String),
    Dir,
    /// Link to a directory. Never followed by `read_dir`.
    DirLink(PathBuf),
}

/// In-memory tree for walk and config tests.
///
/// Paths are stored as given; `"."` is the root and always exists. Adding a
/// file or directory creates its missing parents.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    entries: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
    unreadable: Arc<Mutex<Vec<PathBuf>>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(PathBuf::from("."), MockEntry::Dir);
        Self {
            entries: Arc::new(Mutex::new(entries)),
            unreadable: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.lock();
        Self::ensure_parents(&mut entries, &path);
        entries.insert(path, MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.lock();
        Self::ensure_parents(&mut entries, &path);
        entries.insert(path, MockEntry::Dir);
    }

    /// Add a symlink at `path` pointing to the directory `target`.
    pub fn add_dir_link(&self, path: impl AsRef<Path>, target: impl Into<PathBuf>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.lock();
        Self::ensure_parents(&mut entries, &path);
        entries.insert(path, MockEntry::DirLink(target.into()));
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.lock().retain(|p, _| !p.starts_with(path));
    }

    /// Make `read_dir` on this directory fail with `PermissionDenied`.
    pub fn deny_read(&self, path: impl AsRef<Path>) {
        self.unreadable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.as_ref().to_path_buf());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_parents(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir.as_os_str().is_empty() {
                break;
            }
            entries.entry(dir.to_path_buf()).or_insert(MockEntry::Dir);
            parent = dir.parent();
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        match self.lock().get(path) {
            Some(MockEntry::File(content)) => Ok(content.clone()),
            Some(MockEntry::Dir | MockEntry::DirLink(_)) => {
                Err(io::Error::other(format!("is a directory: {path:?}")))
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {path:?}"),
            )),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        let entries = self.lock();
        match entries.get(path) {
            Some(MockEntry::Dir) => true,
            // Like `Path::is_dir`, a link counts if its target is a directory.
            Some(MockEntry::DirLink(target)) => {
                matches!(entries.get(target.as_path()), Some(MockEntry::Dir))
            }
            _ => false,
        }
    }

    fn is_symlink(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::DirLink(_)))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let denied = self
            .unreadable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|p| p == path);
        if denied {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {path:?}"),
            ));
        }

        let entries = self.lock();
        match entries.get(path) {
            Some(MockEntry::Dir) => Ok(entries
                .keys()
                .filter(|p| p.parent() == Some(path) && p.as_path() != path)
                .cloned()
                .collect()),
            _ => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not a directory or not found: {path:?}"),
            )),
        }
    }
}

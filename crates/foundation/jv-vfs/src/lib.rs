//! Virtual File System for managing source files
//!
//! Files are read from disk on demand. Contents set through the API form an
//! in-memory overlay that takes precedence over the disk, which lets tests and
//! tools analyze module graphs that were never written out.

pub mod resolve;

use anyhow::Result;
use jv_span::FileId;
use rustc_hash::FxHashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub use resolve::{NodeModuleResolver, ResolveFailure, SpecifierKind, is_core_module};

/// Virtual File System that tracks source files
pub struct VirtualFileSystem {
    inner: Arc<RwLock<VfsInner>>,
}

struct VfsInner {
    files: FxHashMap<FileId, FileData>,
    paths: FxHashMap<PathBuf, FileId>,
    next_id: u32,
}

/// Data associated with a file
#[derive(Clone, Debug)]
pub struct FileData {
    /// Path the file was registered under
    pub path: PathBuf,
    /// File contents (if loaded or set in memory)
    pub contents: Option<String>,
    /// Whether the contents live only in memory
    pub in_memory: bool,
}

impl VirtualFileSystem {
    /// Creates a new empty virtual file system
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(VfsInner {
                files: FxHashMap::default(),
                paths: FxHashMap::default(),
                next_id: 0,
            })),
        }
    }

    /// Registers a file path and returns its ID
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned
    pub fn register_file(&self, path: impl AsRef<Path>) -> Result<FileId> {
        let path = path.as_ref().to_path_buf();
        let mut inner = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("Lock poisoned"))?;

        if let Some(&file_id) = inner.paths.get(&path) {
            return Ok(file_id);
        }

        let file_id = FileId::new(inner.next_id);
        inner.next_id += 1;

        inner.files.insert(
            file_id,
            FileData {
                path: path.clone(),
                contents: None,
                in_memory: false,
            },
        );
        inner.paths.insert(path, file_id);

        Ok(file_id)
    }

    /// Registers an in-memory file with the given contents
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<String>) -> Result<FileId> {
        let file_id = self.register_file(path)?;
        let mut inner = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("Lock poisoned"))?;
        if let Some(file_data) = inner.files.get_mut(&file_id) {
            file_data.contents = Some(contents.into());
            file_data.in_memory = true;
        }
        Ok(file_id)
    }

    /// Loads file contents, from memory if present and from disk otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the lock is poisoned
    pub fn load_file(&self, file_id: FileId) -> Result<String> {
        let path = {
            let inner = self
                .inner
                .read()
                .map_err(|_| anyhow::anyhow!("Lock poisoned"))?;
            let file_data = inner
                .files
                .get(&file_id)
                .ok_or_else(|| anyhow::anyhow!("File not found: {file_id:?}"))?;
            if let Some(contents) = &file_data.contents {
                return Ok(contents.clone());
            }
            file_data.path.clone()
        };

        let contents = std::fs::read_to_string(&path)?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("Lock poisoned"))?;
        if let Some(file_data) = inner.files.get_mut(&file_id) {
            file_data.contents = Some(contents.clone());
        }

        Ok(contents)
    }

    /// Registers `path` if needed and loads its contents
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the lock is poisoned
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<(FileId, String)> {
        let file_id = self.register_file(path)?;
        let contents = self.load_file(file_id)?;
        Ok((file_id, contents))
    }

    /// Gets file ID from path
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned
    pub fn get_file_id(&self, path: impl AsRef<Path>) -> Result<Option<FileId>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| anyhow::anyhow!("Lock poisoned"))?;
        Ok(inner.paths.get(path.as_ref()).copied())
    }

    /// Whether `path` names a file, either in memory or on disk
    pub fn is_file(&self, path: &Path) -> bool {
        let in_memory = self.inner.read().is_ok_and(|inner| {
            inner
                .paths
                .get(path)
                .and_then(|id| inner.files.get(id))
                .is_some_and(|data| data.in_memory)
        });
        in_memory || path.is_file()
    }

    /// Whether `path` names a directory, either holding in-memory files or on disk
    pub fn is_dir(&self, path: &Path) -> bool {
        let in_memory = self.inner.read().is_ok_and(|inner| {
            inner
                .files
                .values()
                .any(|data| data.in_memory && data.path.starts_with(path) && data.path != path)
        });
        in_memory || path.is_dir()
    }
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for VirtualFileSystem {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for VirtualFileSystem {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let files = self.inner.read().map_or(0, |inner| inner.files.len());
        formatter.debug_struct("VirtualFileSystem")
            .field("files", &files)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_registration() {
        let vfs = VirtualFileSystem::new();
        let id1 = vfs.register_file("test.js").unwrap();
        let id2 = vfs.register_file("test.js").unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_memory_overlay_wins() {
        let vfs = VirtualFileSystem::new();
        let id = vfs.add_file("/virtual/lib/a.js", "module.exports = 1;").unwrap();
        assert_eq!(vfs.load_file(id).unwrap(), "module.exports = 1;");
        assert!(vfs.is_file(Path::new("/virtual/lib/a.js")));
        assert!(vfs.is_dir(Path::new("/virtual/lib")));
        assert!(!vfs.is_file(Path::new("/virtual/lib/b.js")));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.js");
        std::fs::write(&path, "var a = 2;").unwrap();

        let vfs = VirtualFileSystem::new();
        let (id, contents) = vfs.read_path(&path).unwrap();
        assert_eq!(contents, "var a = 2;");
        assert_eq!(vfs.get_file_id(&path).unwrap(), Some(id));

        std::fs::remove_file(&path).unwrap();
        assert_eq!(vfs.load_file(id).unwrap(), "var a = 2;");
        assert!(!vfs.is_file(&path), "disk contents are cached, not an overlay");
    }
}

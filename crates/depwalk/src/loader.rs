//! Source loading
//!
//! The compiler never touches the disk directly: it goes through a
//! [`FileSystem`] so the same worklist can run against the real file system,
//! an in-memory tree, or whatever storage an embedding tool provides.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use indexmap::IndexMap;
use log::trace;

/// Storage backend consulted for sources the caller did not supply
pub trait FileSystem {
    /// Whether `path` names a readable file
    fn exists(&self, path: &Path) -> bool;

    /// Read the full text content of `path`
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// The process's real file system
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// In-memory file tree keyed by path, in insertion order
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: IndexMap<PathBuf, String>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file, returning the previous content if any
    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Option<String> {
        self.files.insert(path.into(), content.into())
    }

    pub fn remove(&mut self, path: &Path) -> Option<String> {
        self.files.shift_remove(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromIterator<(PathBuf, String)> for MemoryFileSystem {
    fn from_iter<I: IntoIterator<Item = (PathBuf, String)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("No such file: {}", path.display()))
    }
}

/// Outcome of loading one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded {
    Found(String),
    NotFound,
}

/// Resolves the text of a unit, preferring content the caller already attached
pub struct SourceLoader<'a> {
    fs: &'a dyn FileSystem,
}

impl fmt::Debug for SourceLoader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceLoader").finish_non_exhaustive()
    }
}

impl<'a> SourceLoader<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Load the source for `path`.
    ///
    /// Supplied content wins without any storage access. A file that does not
    /// exist is reported as [`Loaded::NotFound`]; a file that exists but cannot
    /// be read is an error.
    pub fn load(&self, path: &Path, supplied: Option<String>) -> Result<Loaded> {
        if let Some(content) = supplied {
            trace!("Using supplied content for {}", path.display());
            return Ok(Loaded::Found(content));
        }

        if !self.fs.exists(path) {
            return Ok(Loaded::NotFound);
        }

        trace!("Reading {}", path.display());
        self.fs.read_to_string(path).map(Loaded::Found)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use tempfile::TempDir;

    use super::*;

    /// Counts reads so tests can assert storage was left alone
    struct CountingFs {
        inner: MemoryFileSystem,
        reads: Cell<usize>,
    }

    impl FileSystem for CountingFs {
        fn exists(&self, path: &Path) -> bool {
            self.inner.exists(path)
        }

        fn read_to_string(&self, path: &Path) -> Result<String> {
            self.reads.set(self.reads.get() + 1);
            self.inner.read_to_string(path)
        }
    }

    #[test]
    fn test_supplied_content_skips_storage() -> Result<()> {
        let mut inner = MemoryFileSystem::new();
        inner.insert("/a.js", "on disk");
        let fs = CountingFs {
            inner,
            reads: Cell::new(0),
        };

        let loaded = SourceLoader::new(&fs).load(Path::new("/a.js"), Some("in memory".to_owned()))?;
        assert_eq!(loaded, Loaded::Found("in memory".to_owned()));
        assert_eq!(fs.reads.get(), 0);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_not_an_error() -> Result<()> {
        let fs = MemoryFileSystem::new();
        let loaded = SourceLoader::new(&fs).load(Path::new("/missing.js"), None)?;
        assert_eq!(loaded, Loaded::NotFound);
        Ok(())
    }

    #[test]
    fn test_reads_from_disk() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("main.js");
        std::fs::write(&path, "export default 1;")?;

        let loader = SourceLoader::new(&OsFileSystem);
        assert_eq!(
            loader.load(&path, None)?,
            Loaded::Found("export default 1;".to_owned())
        );
        assert_eq!(
            loader.load(&temp_dir.path().join("other.js"), None)?,
            Loaded::NotFound
        );
        Ok(())
    }

    #[test]
    fn test_directory_is_not_a_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let loader = SourceLoader::new(&OsFileSystem);
        assert_eq!(loader.load(temp_dir.path(), None)?, Loaded::NotFound);
        Ok(())
    }

    #[test]
    fn test_memory_fs_replace_and_remove() {
        let mut fs = MemoryFileSystem::new();
        assert!(fs.is_empty());
        assert_eq!(fs.insert("/a.js", "one"), None);
        assert_eq!(fs.insert("/a.js", "two"), Some("one".to_owned()));
        assert_eq!(fs.len(), 1);
        assert_eq!(fs.remove(Path::new("/a.js")), Some("two".to_owned()));
        assert!(!fs.exists(Path::new("/a.js")));
    }
}

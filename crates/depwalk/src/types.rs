//! Shared type definitions for the depwalk crate
//!
//! Inputs ([`SourceUnit`]) and outputs ([`CompiledModule`], [`Compilation`])
//! of a compile pass live here so the cache, the hook and the compiler can
//! all name them without depending on each other.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

/// One file participating in the dependency graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceUnit {
    /// Source text, when the caller already has it in memory
    pub content: Option<String>,
    pub options: UnitOptions,
}

/// Per-file options layered over the global transformer settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitOptions {
    /// Canonical path of the file; required for entry units
    pub filename: Option<PathBuf>,
    /// Transformer settings that override the global ones for this file
    pub settings: toml::Table,
}

impl SourceUnit {
    /// A unit whose content will be loaded from storage
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            content: None,
            options: UnitOptions {
                filename: Some(path.into()),
                settings: toml::Table::new(),
            },
        }
    }

    /// A unit with content supplied up front
    pub fn with_content(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::new(path)
        }
    }

    /// Override one transformer setting for this file only
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.options.settings.insert(key.into(), value.into());
        self
    }

    /// The unit's canonical path, if one was declared and is non-empty
    pub fn path(&self) -> Option<&Path> {
        self.options
            .filename
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}

/// Transformer output for one file, tagged with the file's canonical path
#[derive(Debug)]
pub struct CompiledModule<T> {
    pub path: PathBuf,
    /// Shared with the cache when caching is enabled, so repeated passes over
    /// unchanged content hand back the same allocation
    pub result: Arc<T>,
}

impl<T> Clone for CompiledModule<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            result: Arc::clone(&self.result),
        }
    }
}

/// Everything a compile pass produced, in discovery order
#[derive(Debug)]
pub struct Compilation<T> {
    /// Entry files first in caller order, then dependencies breadth-first
    pub modules: Vec<CompiledModule<T>>,
    /// Paths that were referenced but could not be found, one per warning
    pub missing: Vec<PathBuf>,
}

impl<T> Default for Compilation<T> {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
            missing: Vec::new(),
        }
    }
}

impl<T> Compilation<T> {
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Canonical paths of the compiled modules in order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.modules.iter().map(|module| module.path.as_path())
    }

    /// Look up the compiled module for `path`
    pub fn get(&self, path: &Path) -> Option<&CompiledModule<T>> {
        self.modules.iter().find(|module| module.path == path)
    }
}

impl<T> IntoIterator for Compilation<T> {
    type Item = CompiledModule<T>;
    type IntoIter = std::vec::IntoIter<CompiledModule<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Compilation<T> {
    type Item = &'a CompiledModule<T>;
    type IntoIter = std::slice::Iter<'a, CompiledModule<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filename_is_no_path() {
        let mut unit = SourceUnit::new("");
        assert_eq!(unit.path(), None);
        unit.options.filename = None;
        assert_eq!(unit.path(), None);
        assert_eq!(
            SourceUnit::new("/a.js").path(),
            Some(Path::new("/a.js"))
        );
    }

    #[test]
    fn test_with_setting_overrides() {
        let unit = SourceUnit::with_content("/a.js", "x")
            .with_setting("banner", "one")
            .with_setting("banner", "two");
        assert_eq!(
            unit.options.settings.get("banner"),
            Some(&toml::Value::from("two"))
        );
        assert_eq!(unit.content.as_deref(), Some("x"));
    }
}

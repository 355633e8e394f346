//! Transformer output cache
//!
//! A [`TransformCache`] remembers, per canonical path, the content that was fed
//! to the transformer, the result it produced and the module references the
//! hook saw while it ran. The cache is an ordinary value owned by the caller: keep one
//! alive across compile passes to reuse work, drop or [`clear`] it to start
//! over. Entries are partitioned by [`CacheNamespace`] and never shared across
//! partitions.
//!
//! [`clear`]: TransformCache::clear

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer};

use crate::hook::ModuleReference;

/// Cache partition key
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    /// Partition used by `cache = true`
    #[default]
    Shared,
    /// Partition chosen by the caller
    Named(String),
}

impl fmt::Display for CacheNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => write!(f, "<shared>"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// Whether and where a compile pass caches transformer output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Every pass re-transforms every file
    #[default]
    Disabled,
    /// Cache in the shared partition
    Shared,
    /// Cache in a named partition
    Namespace(String),
}

impl CachePolicy {
    /// The partition this policy reads and writes, if caching is on
    pub fn namespace(&self) -> Option<CacheNamespace> {
        match self {
            Self::Disabled => None,
            Self::Shared => Some(CacheNamespace::Shared),
            Self::Namespace(name) => Some(CacheNamespace::Named(name.clone())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl From<bool> for CachePolicy {
    fn from(enabled: bool) -> Self {
        if enabled { Self::Shared } else { Self::Disabled }
    }
}

impl From<&str> for CachePolicy {
    /// An empty name disables caching
    fn from(name: &str) -> Self {
        if name.is_empty() {
            Self::Disabled
        } else {
            Self::Namespace(name.to_owned())
        }
    }
}

impl From<String> for CachePolicy {
    fn from(name: String) -> Self {
        if name.is_empty() {
            Self::Disabled
        } else {
            Self::Namespace(name)
        }
    }
}

impl<'de> Deserialize<'de> for CachePolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Namespace(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Flag(enabled) => enabled.into(),
            Raw::Namespace(name) => name.into(),
        })
    }
}

/// One cached transformation
#[derive(Debug)]
pub struct CacheEntry<T> {
    /// Exact content the result was produced from
    pub content: String,
    pub result: Arc<T>,
    /// References the transformer resolved, in first-seen order. Replayed
    /// through the resolver on a hit so the graph follows current options.
    pub references: Vec<ModuleReference>,
}

impl<T> CacheEntry<T> {
    /// Whether `content` is byte-for-byte what this entry was built from
    pub fn matches(&self, content: &str) -> bool {
        self.content == content
    }
}

type Partition<T> = FxHashMap<PathBuf, CacheEntry<T>>;

/// Namespaced store of transformer results keyed by canonical path
#[derive(Debug)]
pub struct TransformCache<T> {
    partitions: FxHashMap<CacheNamespace, Partition<T>>,
}

impl<T> Default for TransformCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TransformCache<T> {
    pub fn new() -> Self {
        Self {
            partitions: FxHashMap::default(),
        }
    }

    pub fn get(&self, path: &Path, namespace: &CacheNamespace) -> Option<&CacheEntry<T>> {
        self.partitions.get(namespace)?.get(path)
    }

    pub fn contains(&self, path: &Path, namespace: &CacheNamespace) -> bool {
        self.get(path, namespace).is_some()
    }

    /// Store a transformation, replacing whatever was cached for `path` in
    /// `namespace`. Returns the replaced entry.
    pub fn put(
        &mut self,
        path: PathBuf,
        namespace: &CacheNamespace,
        content: String,
        result: Arc<T>,
        references: Vec<ModuleReference>,
    ) -> Option<CacheEntry<T>> {
        self.partitions
            .entry(namespace.clone())
            .or_default()
            .insert(
                path,
                CacheEntry {
                    content,
                    result,
                    references,
                },
            )
    }

    /// Drop every entry in every partition
    pub fn clear(&mut self) {
        debug!("Clearing transform cache ({} entries)", self.len());
        self.partitions.clear();
    }

    /// Drop the entries of a single partition
    pub fn clear_namespace(&mut self, namespace: &CacheNamespace) {
        self.partitions.remove(namespace);
    }

    /// Total number of entries across all partitions
    pub fn len(&self) -> usize {
        self.partitions.values().map(FxHashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Module reference resolution
//!
//! Turns the raw string a source file uses to name a dependency into the
//! canonical path used as the identity key for the worklist and the cache.
//! Resolution is purely lexical: nothing here touches the file system, so a
//! path can be keyed and deduplicated before anyone tries to read it.

use std::{
    borrow::Cow,
    path::{Component, Path, PathBuf},
};

/// Extension appended to references that do not already carry it
pub const DEFAULT_EXTENSION: &str = "js";

/// Maps a module reference plus the path of the file that contains it to a
/// canonical path.
///
/// Implementations must be deterministic: the returned path is used as a
/// deduplication key, so two references naming the same file have to produce
/// byte-identical paths.
pub trait ModulePathResolver {
    fn resolve(&self, reference: &str, referencing_path: &Path) -> PathBuf;
}

impl<F> ModulePathResolver for F
where
    F: Fn(&str, &Path) -> PathBuf,
{
    fn resolve(&self, reference: &str, referencing_path: &Path) -> PathBuf {
        self(reference, referencing_path)
    }
}

/// Default resolution scheme
///
/// 1. Append the default extension unless the reference already ends with it
/// 2. References starting with `.` are joined onto the referencing file's
///    directory and normalized
/// 3. Anything else is taken as already canonical
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultResolver {
    extension: String,
}

impl Default for DefaultResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultResolver {
    pub fn new() -> Self {
        Self::with_extension(DEFAULT_EXTENSION)
    }

    /// Create a resolver that appends `extension` (without the leading dot)
    pub fn with_extension(extension: impl Into<String>) -> Self {
        let extension = extension.into();
        let extension = extension.trim_start_matches('.').to_owned();
        Self { extension }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn apply_extension<'a>(&self, reference: &'a str) -> Cow<'a, str> {
        let has_extension = reference
            .strip_suffix(self.extension.as_str())
            .is_some_and(|stem| stem.ends_with('.'));
        if has_extension || self.extension.is_empty() {
            Cow::Borrowed(reference)
        } else {
            Cow::Owned(format!("{reference}.{}", self.extension))
        }
    }
}

impl ModulePathResolver for DefaultResolver {
    fn resolve(&self, reference: &str, referencing_path: &Path) -> PathBuf {
        let reference = self.apply_extension(reference);

        if !reference.starts_with('.') {
            return PathBuf::from(reference.into_owned());
        }

        let base_dir = referencing_path.parent().unwrap_or_else(|| Path::new(""));
        normalize(&base_dir.join(reference.as_ref()))
    }
}

/// Resolve `reference` from `referencing_path` with the default scheme
pub fn full_path(reference: &str, referencing_path: &Path) -> PathBuf {
    DefaultResolver::new().resolve(reference, referencing_path)
}

/// Lexically collapse `.` and `..` components.
///
/// `..` never climbs above a root; on a relative path with nothing left to pop
/// it is kept.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

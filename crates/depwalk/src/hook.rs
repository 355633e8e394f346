//! Dependency discovery by intercepting the transformer's module resolution.
//!
//! Every reference the transformer resolves goes through [`intercept`], which
//! wraps the caller's own `resolve_module_source` function (or the identity
//! when there is none). The wrapper hands the transformer exactly what the
//! caller's function would have, and on the side resolves the reference to a
//! canonical path and queues it. Discovery therefore sees references the way
//! the transformer consumes them, rewrites included.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use log::trace;

use crate::{resolver::ModulePathResolver, worklist::Worklist};

/// Caller-supplied rewrite applied to each module reference
pub type ResolveModuleSource = dyn Fn(&str, &Path) -> String;

/// A module reference as the transformer asked for it and as it was rewritten
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleReference {
    pub original: String,
    pub rewritten: String,
}

impl ModuleReference {
    /// The string the graph follows
    fn lookup(&self, fetch_from_original: bool) -> &str {
        if fetch_from_original {
            &self.original
        } else {
            &self.rewritten
        }
    }
}

/// State threaded through one transformer invocation
pub struct DependencyContext<'a> {
    worklist: &'a mut Worklist,
    resolver: &'a dyn ModulePathResolver,
    fetch_from_original: bool,
    /// Canonical paths seen in the current file, first occurrence first
    dependencies: IndexSet<PathBuf>,
    references: IndexSet<ModuleReference>,
}

impl std::fmt::Debug for DependencyContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyContext")
            .field("fetch_from_original", &self.fetch_from_original)
            .field("dependencies", &self.dependencies)
            .field("references", &self.references)
            .finish_non_exhaustive()
    }
}

impl<'a> DependencyContext<'a> {
    /// `fetch_from_original` selects whether the graph follows the reference
    /// as written in the source (`true`) or as rewritten by the caller's
    /// `resolve_module_source` (`false`)
    pub fn new(
        worklist: &'a mut Worklist,
        resolver: &'a dyn ModulePathResolver,
        fetch_from_original: bool,
    ) -> Self {
        Self {
            worklist,
            resolver,
            fetch_from_original,
            dependencies: IndexSet::new(),
            references: IndexSet::new(),
        }
    }

    /// Resolve `reference` from `referencing_path` and queue the resulting
    /// path if it is new
    fn register(&mut self, reference: ModuleReference, referencing_path: &Path) {
        let lookup = reference.lookup(self.fetch_from_original);
        let path = self.resolver.resolve(lookup, referencing_path);
        trace!(
            "{} references '{lookup}' -> {}",
            referencing_path.display(),
            path.display()
        );
        if self.dependencies.insert(path.clone()) {
            self.worklist.enqueue(path);
        }
        self.references.insert(reference);
    }

    /// Queue the dependencies of `referencing_path` from references recorded
    /// by an earlier transformation of it, resolved with the current options
    pub fn replay(&mut self, references: &[ModuleReference], referencing_path: &Path) {
        for reference in references {
            self.register(reference.clone(), referencing_path);
        }
    }

    /// Dependencies seen so far, in first-seen order
    pub fn into_dependencies(self) -> Vec<PathBuf> {
        self.dependencies.into_iter().collect()
    }

    /// References seen so far, deduplicated, in first-seen order
    pub fn into_references(self) -> Vec<ModuleReference> {
        self.references.into_iter().collect()
    }
}

/// Wrap `original` so that every call also registers the referenced file.
///
/// The returned function has the signature the transformer expects and
/// returns whatever `original` returns (the reference unchanged if there is
/// no `original`).
pub fn intercept<'c, 'a: 'c>(
    original: Option<&'c ResolveModuleSource>,
    context: &'c mut DependencyContext<'a>,
) -> impl FnMut(&str, &Path) -> String + 'c {
    move |reference: &str, referencing_path: &Path| {
        let rewritten = match original {
            Some(resolve) => resolve(reference, referencing_path),
            None => reference.to_owned(),
        };

        context.register(
            ModuleReference {
                original: reference.to_owned(),
                rewritten: rewritten.clone(),
            },
            referencing_path,
        );

        rewritten
    }
}

//! Worklist compiler
//!
//! Expands a set of entry files into everything they transitively reference
//! and runs each file through the transformer exactly once per pass.
//!
//! Files are processed strictly in queue order. Discovering the dependencies
//! of one file appends to the back of the queue, so the result order is the
//! entry files as given followed by their dependencies breadth-first. Every
//! file is loaded, transformed and its references queued before the next one
//! is taken, which keeps the visited set authoritative without any locking.

use std::{fmt, path::Path, sync::Arc};

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::{
    cache::{CacheNamespace, TransformCache},
    config::CompileOptions,
    hook::{DependencyContext, intercept},
    loader::{FileSystem, Loaded, SourceLoader},
    transformer::{TransformOptions, Transformer},
    types::{CompiledModule, Compilation, SourceUnit},
    worklist::Worklist,
};

/// Drives a [`Transformer`] over the dependency graph of a set of entry files
pub struct Compiler<'a, T> {
    transformer: &'a T,
    fs: &'a dyn FileSystem,
    options: &'a CompileOptions,
}

impl<T: fmt::Debug> fmt::Debug for Compiler<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("transformer", &self.transformer)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// State for one call to [`Compiler::compile`]
struct Pass<'p, O> {
    worklist: Worklist,
    cache: &'p mut TransformCache<O>,
    namespace: Option<CacheNamespace>,
    skip_cached: bool,
    compilation: Compilation<O>,
    transformed: usize,
    reused: usize,
    skipped: usize,
}

impl<'a, T: Transformer> Compiler<'a, T> {
    pub fn new(transformer: &'a T, fs: &'a dyn FileSystem, options: &'a CompileOptions) -> Self {
        Self {
            transformer,
            fs,
            options,
        }
    }

    /// Compile `entries` and everything they reference.
    ///
    /// Fails before touching any file if an entry has no path. Missing files
    /// are logged, listed in [`Compilation::missing`] and otherwise ignored.
    /// A transformer error aborts the pass.
    pub fn compile(
        &self,
        entries: Vec<SourceUnit>,
        cache: &mut TransformCache<T::Output>,
    ) -> Result<Compilation<T::Output>> {
        let worklist = Worklist::seed(entries)?;
        debug!("Compiling {} entry file(s)", worklist.len());

        let mut pass = Pass {
            worklist,
            cache,
            namespace: self.options.cache.namespace(),
            skip_cached: self.options.skips_cached_files(),
            compilation: Compilation::default(),
            transformed: 0,
            reused: 0,
            skipped: 0,
        };

        while let Some(unit) = pass.worklist.pop() {
            self.compile_unit(&mut pass, unit)?;
        }

        debug!(
            "Compiled {} file(s): {} transformed, {} from cache, {} skipped, {} missing",
            pass.compilation.len(),
            pass.transformed,
            pass.reused,
            pass.skipped,
            pass.compilation.missing.len()
        );
        Ok(pass.compilation)
    }

    fn compile_unit(&self, pass: &mut Pass<'_, T::Output>, unit: SourceUnit) -> Result<()> {
        let Some(path) = unit.path().map(Path::to_path_buf) else {
            return Ok(());
        };
        let SourceUnit { content, options } = unit;

        let cached = pass
            .namespace
            .as_ref()
            .and_then(|namespace| pass.cache.get(&path, namespace));

        // Skip mode trusts the cache for anything the caller did not hand us
        // fresh content for
        if pass.skip_cached
            && let Some(entry) = cached
            && content.as_deref().is_none_or(|content| entry.matches(content))
        {
            debug!("Skipping cached {}", path.display());
            pass.skipped += 1;
            return Ok(());
        }

        let content = match SourceLoader::new(self.fs).load(&path, content)? {
            Loaded::Found(content) => content,
            Loaded::NotFound => {
                warn!("Could not find {}", path.display());
                pass.compilation.missing.push(path);
                return Ok(());
            }
        };

        if let Some(entry) = cached.filter(|entry| entry.matches(&content)) {
            debug!("Reusing cached result for {}", path.display());
            self.dependency_context(&mut pass.worklist)
                .replay(&entry.references, &path);
            pass.compilation.modules.push(CompiledModule {
                path,
                result: Arc::clone(&entry.result),
            });
            pass.reused += 1;
            return Ok(());
        }

        let transform_options = TransformOptions::layered(&self.options.transform, options, path.clone());
        let mut context = self.dependency_context(&mut pass.worklist);
        let output = {
            let mut resolve_module_source =
                intercept(self.options.resolve_module_source.as_deref(), &mut context);
            self.transformer
                .transform(&content, &transform_options, &mut resolve_module_source)
                .with_context(|| format!("Failed to transform {}", path.display()))?
        };
        let references = context.into_references();
        debug!(
            "Transformed {} ({} references)",
            path.display(),
            references.len()
        );

        let result = Arc::new(output);
        if let Some(namespace) = &pass.namespace {
            pass.cache.put(
                path.clone(),
                namespace,
                content,
                Arc::clone(&result),
                references,
            );
        }
        pass.compilation.modules.push(CompiledModule { path, result });
        pass.transformed += 1;
        Ok(())
    }

    fn dependency_context<'w>(&'w self, worklist: &'w mut Worklist) -> DependencyContext<'w> {
        DependencyContext::new(
            worklist,
            &*self.options.resolve_module_to_path,
            self.options.fetch_from_original_module_source,
        )
    }
}

/// Compile `entries` with a one-off [`Compiler`]
pub fn compile_files<T: Transformer>(
    entries: Vec<SourceUnit>,
    options: &CompileOptions,
    transformer: &T,
    fs: &dyn FileSystem,
    cache: &mut TransformCache<T::Output>,
) -> Result<Compilation<T::Output>> {
    Compiler::new(transformer, fs, options).compile(entries, cache)
}

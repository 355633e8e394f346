//! Configuration for compile passes
//!
//! Two layers: [`Config`] is plain data that can be read from a TOML file, and
//! [`CompileOptions`] is what the compiler actually consumes, a `Config` plus
//! the callable hooks that cannot live in a file.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use etcetera::BaseStrategy;
use log::{debug, warn};
use serde::Deserialize;

use crate::{
    cache::CachePolicy,
    hook::ResolveModuleSource,
    resolver::{DefaultResolver, ModulePathResolver},
};

/// File name looked up in a project directory
pub const CONFIG_FILE_NAME: &str = "depwalk.toml";

/// File-backed settings
///
/// ```toml
/// cache = "dev"                 # false, true, or a namespace
/// skip_cached_files = false
/// fetch_from_original_module_source = false
/// default_extension = "js"
///
/// [transform]                   # passed through to the transformer
/// banner = "/* built */"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub cache: CachePolicy,
    pub skip_cached_files: bool,
    pub fetch_from_original_module_source: bool,
    /// Extension the default resolver appends; `js` when unset
    pub default_extension: Option<String>,
    pub transform: toml::Table,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid depwalk configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("In {}", path.display()))
    }

    /// Look for `depwalk.toml` in `dir`, then in the user configuration
    /// directory. Returns the file that was used alongside its contents.
    pub fn discover(dir: &Path) -> Result<Option<(PathBuf, Self)>> {
        let candidates = std::iter::once(dir.join(CONFIG_FILE_NAME)).chain(user_config_path());
        for candidate in candidates {
            if candidate.is_file() {
                debug!("Using config file {}", candidate.display());
                let config = Self::load(&candidate)?;
                return Ok(Some((candidate, config)));
            }
        }
        Ok(None)
    }
}

/// `<user config dir>/depwalk/config.toml`, if a home directory can be found
pub fn user_config_path() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("depwalk").join("config.toml"))
}

/// Everything that shapes one compile pass
pub struct CompileOptions {
    pub cache: CachePolicy,
    /// Skip cached paths outright instead of validating their content
    pub skip_cached_files: bool,
    /// Build the graph from references as written rather than as rewritten by
    /// `resolve_module_source`
    pub fetch_from_original_module_source: bool,
    /// Maps module references to canonical paths
    pub resolve_module_to_path: Box<dyn ModulePathResolver>,
    /// Rewrites references before the transformer uses them
    pub resolve_module_source: Option<Box<ResolveModuleSource>>,
    /// Global transformer settings; per-file settings override these
    pub transform: toml::Table,
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOptions")
            .field("cache", &self.cache)
            .field("skip_cached_files", &self.skip_cached_files)
            .field(
                "fetch_from_original_module_source",
                &self.fetch_from_original_module_source,
            )
            .field("resolve_module_source", &self.resolve_module_source.is_some())
            .field("transform", &self.transform)
            .finish_non_exhaustive()
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::from_config(Config::default())
    }
}

impl From<Config> for CompileOptions {
    fn from(config: Config) -> Self {
        Self::from_config(config)
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: Config) -> Self {
        let resolver = config
            .default_extension
            .map_or_else(DefaultResolver::new, DefaultResolver::with_extension);
        Self {
            cache: config.cache,
            skip_cached_files: config.skip_cached_files,
            fetch_from_original_module_source: config.fetch_from_original_module_source,
            resolve_module_to_path: Box::new(resolver),
            resolve_module_source: None,
            transform: config.transform,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: impl Into<CachePolicy>) -> Self {
        self.cache = cache.into();
        self
    }

    #[must_use]
    pub fn with_skip_cached_files(mut self, skip: bool) -> Self {
        self.skip_cached_files = skip;
        self
    }

    #[must_use]
    pub fn with_fetch_from_original_module_source(mut self, fetch: bool) -> Self {
        self.fetch_from_original_module_source = fetch;
        self
    }

    #[must_use]
    pub fn with_module_path_resolver(
        mut self,
        resolver: impl ModulePathResolver + 'static,
    ) -> Self {
        self.resolve_module_to_path = Box::new(resolver);
        self
    }

    #[must_use]
    pub fn with_module_source_resolver(
        mut self,
        resolve: impl Fn(&str, &Path) -> String + 'static,
    ) -> Self {
        self.resolve_module_source = Some(Box::new(resolve));
        self
    }

    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.transform.insert(key.into(), value.into());
        self
    }

    /// Whether this pass should skip cached paths.
    ///
    /// Skipping needs a cache to consult; without one the flag is ignored.
    pub(crate) fn skips_cached_files(&self) -> bool {
        if self.skip_cached_files && !self.cache.is_enabled() {
            warn!("skip_cached_files has no effect while caching is disabled");
            return false;
        }
        self.skip_cached_files
    }
}

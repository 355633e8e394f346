//! The seam between the compiler and the source transformer it drives

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::types::UnitOptions;

/// Callback the transformer invokes for every module reference it meets.
///
/// Receives the raw reference and the path of the file being transformed and
/// returns the reference the transformer should continue with.
pub type ModuleSourceCallback<'a> = dyn FnMut(&str, &Path) -> String + 'a;

/// A source-to-source transformer.
///
/// The compiler treats it as a black box. The one contract it relies on is that
/// `transform` calls `resolve_module_source` for each module reference in
/// `source` and uses the returned string in place of the reference; that call
/// is how dependencies are discovered.
pub trait Transformer {
    type Output;

    fn transform(
        &self,
        source: &str,
        options: &TransformOptions,
        resolve_module_source: &mut ModuleSourceCallback<'_>,
    ) -> Result<Self::Output>;
}

/// Settings for a single transformer invocation.
///
/// Built by layering the unit's own settings over the global ones; immutable
/// once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOptions {
    filename: PathBuf,
    settings: toml::Table,
}

impl TransformOptions {
    /// Layer `unit` over `global`, per-file keys winning on conflict
    pub fn layered(global: &toml::Table, unit: UnitOptions, filename: PathBuf) -> Self {
        let mut settings = global.clone();
        settings.extend(unit.settings);
        Self { filename, settings }
    }

    /// Canonical path of the file being transformed
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn settings(&self) -> &toml::Table {
        &self.settings
    }

    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.settings.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(toml::Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(toml::Value::as_bool)
    }
}

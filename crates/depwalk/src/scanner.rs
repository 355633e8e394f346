//! Lightweight transformer for ES-module and CommonJS style sources.
//!
//! Finds module specifiers with a regular expression instead of a parser:
//!
//! - `import x from "spec"`, `export { x } from "spec"`, `export * from "spec"`
//! - `import "spec"`
//! - `import("spec")`, `require("spec")`
//!
//! Each specifier is passed through the module source callback and replaced in
//! the output by whatever the callback returns. Specifiers inside comments and
//! string literals are not distinguished from real ones.

use std::path::PathBuf;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::transformer::{ModuleSourceCallback, TransformOptions, Transformer};

static SPECIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:\bfrom\s*|\bimport\s*|\b(?:require|import)\s*\(\s*)["'](?P<spec>[^"'\r\n]+)["']"#,
    )
    .expect("specifier pattern is valid")
});

/// Setting holding text to prepend to every output
pub const BANNER_SETTING: &str = "banner";

/// Output of [`ImportScanner`] for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedModule {
    pub filename: PathBuf,
    /// Source with every specifier replaced by the callback's answer
    pub code: String,
    /// Specifiers as rewritten, in source order
    pub imports: Vec<String>,
}

/// Regex-based [`Transformer`] that rewrites module specifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportScanner;

impl ImportScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for ImportScanner {
    type Output = ScannedModule;

    fn transform(
        &self,
        source: &str,
        options: &TransformOptions,
        resolve_module_source: &mut ModuleSourceCallback<'_>,
    ) -> Result<ScannedModule> {
        let filename = options.filename();
        let mut code = String::with_capacity(source.len());
        let mut imports = Vec::new();
        let mut last_end = 0;

        for captures in SPECIFIER.captures_iter(source) {
            let Some(spec) = captures.name("spec") else {
                continue;
            };
            let rewritten = resolve_module_source(spec.as_str(), filename);
            code.push_str(&source[last_end..spec.start()]);
            code.push_str(&rewritten);
            last_end = spec.end();
            imports.push(rewritten);
        }
        code.push_str(&source[last_end..]);

        if let Some(banner) = options.get_str(BANNER_SETTING) {
            code = format!("{banner}\n{code}");
        }

        Ok(ScannedModule {
            filename: filename.to_path_buf(),
            code,
            imports,
        })
    }
}

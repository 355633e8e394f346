//! Dependency-graph discovery and cached compilation for pluggable source
//! transformers.
//!
//! Given a set of entry files, depwalk follows every module reference the
//! transformer resolves, compiles each reachable file exactly once and returns
//! the results in discovery order. A [`TransformCache`] kept across passes lets
//! unchanged files reuse earlier output.
//!
//! ```no_run
//! use depwalk::{CompileOptions, ImportScanner, OsFileSystem, SourceUnit, TransformCache, compile_files};
//!
//! # fn main() -> anyhow::Result<()> {
//! let options = CompileOptions::new().with_cache(true);
//! let mut cache = TransformCache::new();
//! let compilation = compile_files(
//!     vec![SourceUnit::new("/project/src/main.js")],
//!     &options,
//!     &ImportScanner::new(),
//!     &OsFileSystem,
//!     &mut cache,
//! )?;
//! for module in &compilation {
//!     println!("{}", module.path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod compiler;
pub mod config;
pub mod hook;
pub mod loader;
pub mod resolver;
pub mod scanner;
pub mod transformer;
pub mod types;
pub mod worklist;

pub use cache::{CacheEntry, CacheNamespace, CachePolicy, TransformCache};
pub use compiler::{Compiler, compile_files};
pub use config::{CompileOptions, Config};
pub use hook::ModuleReference;
pub use loader::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use resolver::{DefaultResolver, ModulePathResolver, full_path};
pub use scanner::{ImportScanner, ScannedModule};
pub use transformer::{ModuleSourceCallback, TransformOptions, Transformer};
pub use types::{Compilation, CompiledModule, SourceUnit, UnitOptions};
pub use worklist::MissingPathError;

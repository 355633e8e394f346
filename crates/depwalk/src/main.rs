use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use depwalk::{
    CachePolicy, CompileOptions, Compiler, Config, ImportScanner, OsFileSystem, SourceUnit,
    TransformCache,
};
use log::{LevelFilter, debug, info};

/// Follow the module references of entry files and list every file reached
#[derive(Parser, Debug)]
#[command(name = "depwalk", version, about, long_about = None)]
struct Cli {
    /// Entry source files
    #[arg(required = true)]
    entries: Vec<PathBuf>,

    /// Configuration file (defaults to ./depwalk.toml, then the user config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cache transformer output, optionally under a namespace (an empty
    /// namespace disables caching)
    #[arg(long, value_name = "NAMESPACE")]
    cache: Option<Option<String>>,

    /// Skip files that are already cached instead of revalidating them
    #[arg(long)]
    skip_cached: bool,

    /// Run the compilation this many times against one cache
    #[arg(long, default_value_t = 1)]
    passes: usize,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    if let Some(path) = &cli.config {
        return Config::load(path);
    }
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Ok(Config::discover(&cwd)?
        .map(|(_, config)| config)
        .unwrap_or_default())
}

/// `--cache` alone selects the shared partition, `--cache NAME` reads like
/// `cache = "NAME"` in the config file
fn cache_policy(namespace: Option<&str>) -> CachePolicy {
    namespace.map_or(CachePolicy::Shared, CachePolicy::from)
}

/// Returns whether every referenced file was found
fn run(cli: &Cli) -> Result<bool> {
    let mut config = load_config(cli)?;
    if let Some(namespace) = &cli.cache {
        config.cache = cache_policy(namespace.as_deref());
    }
    config.skip_cached_files |= cli.skip_cached;
    debug!("Effective configuration: {config:?}");

    let entries = cli
        .entries
        .iter()
        .map(|entry| {
            std::path::absolute(entry)
                .map(SourceUnit::new)
                .with_context(|| format!("Invalid entry path {}", entry.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let options = CompileOptions::from(config);
    let scanner = ImportScanner::new();
    let compiler = Compiler::new(&scanner, &OsFileSystem, &options);
    let mut cache = TransformCache::new();

    let mut last = None;
    for pass in 1..=cli.passes.max(1) {
        let compilation = compiler.compile(entries.clone(), &mut cache)?;
        info!("Pass {pass}: {} file(s)", compilation.len());
        last = Some(compilation);
    }
    let Some(compilation) = last else {
        return Ok(true);
    };

    let mut stdout = io::stdout().lock();
    for module in &compilation {
        writeln!(stdout, "{}", module.path.display())?;
    }
    Ok(compilation.missing.is_empty())
}

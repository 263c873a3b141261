use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use regex::Regex;
use std::path::PathBuf;
use std::time::Instant;

use hastemap::config::HasteConfig;
use hastemap::core::HasteMapBuilder;
use hastemap::formatters::{JsonFormatter, SnapshotFormatter};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "hastemap",
    version = "0.1.0",
    author = "hastemap developers",
    about = "Fast module-identity and dependency indexing for large source trees"
)]
struct Cli {
    /// Root directories to crawl
    #[arg(value_name = "ROOTS", required = true)]
    roots: Vec<PathBuf>,

    /// Map name, used to key the persistent cache
    #[arg(short, long, value_name = "NAME", default_value = "haste-map")]
    name: String,

    /// Comma-separated list of file extensions to index
    #[arg(
        short,
        long,
        value_name = "EXTS",
        value_delimiter = ',',
        default_value = "js"
    )]
    extensions: Vec<String>,

    /// Comma-separated list of platform suffixes, e.g. ios,android
    #[arg(short, long, value_name = "PLATFORMS", value_delimiter = ',')]
    platforms: Vec<String>,

    /// Regex of paths to exclude from the crawl
    #[arg(short, long, value_name = "REGEX")]
    ignore: Option<String>,

    /// Directory holding the persistent cache
    #[arg(long, value_name = "PATH")]
    cache_dir: Option<PathBuf>,

    /// Build from scratch and skip persisting the result
    #[arg(long)]
    no_cache: bool,

    /// Write the index to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format: snapshot, json
    #[arg(short, long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Snapshot)]
    format: OutputFormat,

    /// Emit JSON on a single line instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum OutputFormat {
    Snapshot,
    Json,
}

impl OutputFormat {
    fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Snapshot => "snapshot",
            OutputFormat::Json => "json",
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        roots,
        name,
        extensions,
        platforms,
        ignore,
        cache_dir,
        no_cache,
        output,
        format,
        compact,
    } = cli;

    let start_time = Instant::now();

    let extensions = normalize_list(extensions);
    let platforms = normalize_list(platforms);

    let mut config = HasteConfig::new(roots)
        .with_name(name.as_str())
        .with_extensions(extensions)
        .with_platforms(platforms);
    if let Some(pattern) = ignore.as_deref() {
        let compiled = Regex::new(pattern)
            .with_context(|| format!("invalid ignore pattern '{pattern}'"))?;
        config = config.with_ignore_pattern(compiled);
    }
    if let Some(dir) = cache_dir {
        config = config.with_cache_dir(dir);
    }

    println!("hastemap - {}", name);
    for root in &config.roots {
        println!("Root: {}", root.display());
    }
    println!("Extensions: {:?}", config.extensions);
    if !config.platforms.is_empty() {
        println!("Platforms: {:?}", config.platforms);
    }

    let mut builder = HasteMapBuilder::new(config);
    if !no_cache {
        builder = builder.with_cache();
    }
    if let Some(cache_path) = builder.cache_path() {
        println!("Cache: {}", cache_path.display());
    }

    let build_start = Instant::now();
    let index = builder.build()?;
    let build_time = build_start.elapsed();

    let stats = index.stats();
    println!(
        "Indexed {} files in {:.2}s ({} extracted, {} reused)",
        index.len(),
        build_time.as_secs_f64(),
        stats.files_extracted,
        stats.files_reused
    );
    println!("Modules: {}", index.modules().count());

    if !index.diagnostics().is_empty() {
        eprintln!("{} diagnostics:", index.diagnostics().len());
        for diagnostic in index.diagnostics() {
            eprintln!(
                "  [{:?}] {}: {}",
                diagnostic.kind,
                diagnostic.path.display(),
                diagnostic.message
            );
        }
    }

    if let Some(output) = output {
        match format {
            OutputFormat::Snapshot => {
                if SnapshotFormatter::new().write_if_absent(&index, &output)? {
                    println!("Snapshot: {}", output.display());
                } else {
                    println!("Snapshot {} already exists, skipping", output.display());
                }
            }
            OutputFormat::Json => {
                let formatter = if compact {
                    JsonFormatter::compact()
                } else {
                    JsonFormatter::new()
                };
                formatter.format_to_file(&index, &output)?;
                println!("JSON output: {}", output.display());
            }
        }
        println!("Format: {}", format.as_str());
    }

    println!(
        "Total execution time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

fn normalize_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use keyscout::{
    search_with_stats, CliOverrides, DecodeMode, ResultMap, ScanStats, SearchConfig, Strategy,
};
use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct CliSearchConfig {
    /// Keyword to search for (repeatable, or comma-separated)
    #[arg(short = 'k', long = "keyword")]
    keywords: Vec<String>,

    /// File or directory to search [default: .]
    #[arg(short = 'd', long)]
    root: Option<PathBuf>,

    /// File extensions to scan when walking a directory (e.g. txt,log)
    #[arg(short = 'e', long)]
    extensions: Option<String>,

    /// Number of workers to use [default: CPU cores]
    #[arg(short = 'j', long)]
    workers: Option<NonZeroUsize>,

    /// Work distribution strategy (shared|isolated) [default: shared]
    #[arg(long)]
    strategy: Option<String>,

    /// How to handle invalid UTF-8 sequences (ignore|replace) [default: ignore]
    #[arg(long)]
    encoding: Option<String>,

    /// Abort the search after this long (e.g. 30s, 2m)
    #[arg(long)]
    timeout: Option<String>,

    /// Print the keyword mapping as JSON
    #[arg(long)]
    json: bool,

    /// Show only statistics, not the keyword mapping
    #[arg(short, long)]
    stats: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search text files for keywords
    Search(Box<CliSearchConfig>),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => run_search(*args),
    }
}

fn run_search(args: CliSearchConfig) -> Result<()> {
    let file_config = SearchConfig::load_from(args.config.as_deref())
        .context("Failed to load configuration")?;

    let cli_config = CliOverrides {
        keywords: split_keywords(&args.keywords),
        root_path: args.root,
        extensions: args.extensions.as_deref().map(|exts| {
            exts.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        }),
        worker_count: args.workers,
        strategy: args.strategy.as_deref().map(str::parse::<Strategy>).transpose()?,
        decode_mode: args
            .encoding
            .as_deref()
            .map(str::parse::<DecodeMode>)
            .transpose()?,
        timeout: args.timeout,
        stats_only: args.stats,
        log_level: args.log_level,
    };

    let mut config = file_config.merge_with_cli(cli_config);
    init_tracing(&config.log_level);
    tracing::debug!("Effective configuration: {:?}", config);

    if config.keywords.is_empty() {
        config.keywords = prompt_keywords()?;
    }

    let started = Instant::now();
    let report = search_with_stats(&config)?;
    let elapsed = started.elapsed();

    if config.stats_only {
        print_stats(&report.results, &report.stats, elapsed);
    } else if args.json {
        eprintln!("time: {:.6}s", elapsed.as_secs_f64());
        println!("{}", report.results.to_json()?);
    } else {
        print_results(&report.results, elapsed);
    }
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Splits repeated and comma-separated keyword arguments, dropping blanks
fn split_keywords(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|arg| arg.split(','))
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn prompt_keywords() -> Result<Vec<String>> {
    print!("keywords (comma): ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let keywords = split_keywords(&[line]);
    if keywords.is_empty() {
        anyhow::bail!("At least one keyword is required");
    }
    Ok(keywords)
}

fn print_results(results: &ResultMap, elapsed: Duration) {
    println!("time: {:.6}s", elapsed.as_secs_f64());

    for (keyword, files) in results.iter() {
        if files.is_empty() {
            println!("{}: {}", keyword.blue(), "no files".dimmed());
            continue;
        }
        println!("{}: {} files", keyword.blue(), files.len().to_string().green());
        for file in files {
            println!("  {}", file.display());
        }
    }
}

fn print_stats(results: &ResultMap, stats: &ScanStats, elapsed: Duration) {
    let matched = results.iter().filter(|(_, files)| !files.is_empty()).count();
    println!("time: {:.6}s", elapsed.as_secs_f64());
    println!(
        "Matched {} of {} keywords in {} files",
        matched,
        results.len(),
        results.files_with_matches()
    );
    println!(
        "Scanned {} files ({} unreadable, {} early exits, {} lines)",
        stats.files_scanned, stats.files_unreadable, stats.early_exits, stats.lines_read
    );
}

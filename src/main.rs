//! Spindle main entry point
//!
//! This is the command-line interface for the Spindle web crawler.

use clap::Parser;
use spindle::config::load_config_with_hash;
use spindle::crawler::crawl;
use spindle::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Spindle: a profile-driven breadth-first web crawler
///
/// Spindle crawls independently configured profiles, content-addresses
/// every fetched page, and records per-URL metadata and the link graph
/// for later indexing.
#[derive(Parser, Debug)]
#[command(name = "spindle")]
#[command(version)]
#[command(about = "A profile-driven web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration before logging so the config's log settings apply.
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    setup_logging(cli.verbose, cli.quiet, &config)?;
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    match crawl(&config).await {
        Ok(()) => {
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the tracing subscriber from the CLI flags and config
///
/// `-q` wins over everything; otherwise the config's `debug` flag raises
/// the baseline one notch and `-v` counts take it from there.
fn setup_logging(verbose: u8, quiet: bool, config: &Config) -> anyhow::Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        let level = verbose + u8::from(config.crawl.debug);
        match level {
            0 => EnvFilter::new("spindle=info,warn"),
            1 => EnvFilter::new("spindle=debug,info"),
            2 => EnvFilter::new("spindle=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match &config.crawl.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => builder.init(),
    }

    Ok(())
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config) {
    println!("=== Spindle Dry Run ===\n");

    println!("Crawl Options:");
    println!("  Cache dir: {}", config.crawl.cache_dir);
    println!("  Graph dir: {}", config.crawl.graph_dir);
    println!("  Database dir: {}", config.crawl.database_dir);

    println!("\nProfiles ({}):", config.profiles.len());
    for profile in &config.profiles {
        println!(
            "  - {} (depth {}, {} seeds{})",
            profile.name,
            profile.depth,
            profile.locations.len(),
            if profile.same_domain {
                ", same-domain"
            } else {
                ""
            }
        );
        for seed in &profile.locations {
            println!("    * {}", seed);
        }
        for pattern in &profile.filter {
            println!("    filter: {}", pattern);
        }
        for pattern in &profile.matches {
            println!("    match: {}", pattern);
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config
            .profiles
            .iter()
            .map(|p| p.locations.len())
            .sum::<usize>()
    );
}

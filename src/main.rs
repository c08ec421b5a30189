//! Geomirror main entry point
//!
//! Command-line interface for mirroring open-data portals exposed as plain
//! HTTP directory listings, driven by a tab-separated manifest of root URLs.

use anyhow::Context;
use clap::Parser;
use geomirror::config::{load_config_with_hash, Config};
use geomirror::crawl::{mirror, MirrorOptions};
use geomirror::manifest::load_manifest;
use geomirror::output::print_summary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Geomirror: mirror hierarchical open-data portals onto local storage
///
/// Geomirror walks remote HTTP directory listings recursively, downloads
/// every file into a local tree that mirrors the remote hierarchy, and can
/// resume an interrupted transfer from its completion log.
#[derive(Parser, Debug)]
#[command(name = "geomirror")]
#[command(version)]
#[command(about = "Mirror HTTP directory listings onto local storage", long_about = None)]
struct Cli {
    /// Path to the tab-separated manifest of root URLs
    #[arg(value_name = "MANIFEST")]
    manifest: PathBuf,

    /// Destination directory for the mirrored tree
    #[arg(long, default_value = "./downloads")]
    output: PathBuf,

    /// Number of parallel downloads (defaults to the configured value)
    #[arg(long)]
    workers: Option<usize>,

    /// Only process manifest rows with this format
    #[arg(long, conflicts_with = "list_formats")]
    format: Option<String>,

    /// List the formats present in the manifest and exit
    #[arg(long)]
    list_formats: bool,

    /// Resume previously interrupted downloads
    #[arg(long)]
    resume: bool,

    /// Path to an optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let manifest = load_manifest(&cli.manifest)
        .with_context(|| format!("failed to load manifest {}", cli.manifest.display()))?;

    if cli.list_formats {
        handle_list_formats(&manifest);
        return Ok(());
    }

    tracing::info!(
        "Manifest: {} ({} rows), output: {}",
        cli.manifest.display(),
        manifest.rows.len(),
        cli.output.display()
    );
    if cli.resume {
        tracing::info!("Resume mode enabled: interrupted downloads will be continued");
    }

    let options = MirrorOptions {
        output_root: cli.output,
        resume: cli.resume,
        workers: cli.workers,
        format_filter: cli.format.clone(),
    };

    let summary = mirror(&config, options, &manifest).await?;

    print_summary(&summary, cli.resume, cli.format.as_deref());

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("geomirror=info,warn"),
            1 => EnvFilter::new("geomirror=debug,info"),
            2 => EnvFilter::new("geomirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --list-formats mode
fn handle_list_formats(manifest: &geomirror::manifest::Manifest) {
    if !manifest.has_format_column {
        println!("The manifest has no 'format' column.");
        return;
    }

    let formats = manifest.available_formats();
    if formats.is_empty() {
        println!("The manifest's 'format' column is empty.");
        return;
    }

    println!("Available formats:");
    for format in &formats {
        println!("  - {}", format);
    }
    println!("\nUse --format to restrict the run to one of them.");
}

//! fnindex CLI - searchable function index for Unity C# projects

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::Parser;
use fnindex_core::config::{self, DEFAULT_OUTPUT};
use fnindex_core::{render_json, render_markdown, scan_project, write_index, RenderOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fnindex")]
#[command(
    about = "Scan a Unity project and generate a Markdown index of its C# functions, comments and attributes"
)]
#[command(version)]
struct Cli {
    /// Path to the project root (the directory containing `Assets`)
    project_root: PathBuf,

    /// Output file path (default: functions-index.md, or the config's `output`)
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "markdown")]
    format: OutputFormat,

    /// Path to config file (default: auto-discover in the project root)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, clap::ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Pick the output path: explicit argument, then config, then a default
/// whose extension follows the format
fn resolve_output_path(
    explicit: Option<PathBuf>,
    configured: &Path,
    format: OutputFormat,
) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    if format == OutputFormat::Json && configured == Path::new(DEFAULT_OUTPUT) {
        return configured.with_extension("json");
    }
    configured.to_path_buf()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    // Normalize path to absolute
    let project_root = if cli.project_root.is_relative() {
        std::env::current_dir()?.join(&cli.project_root)
    } else {
        cli.project_root.clone()
    };

    // Validate path exists
    if !project_root.is_dir() {
        anyhow::bail!("Project root does not exist: {}", project_root.display());
    }

    let resolved_config = config::load_and_resolve(&project_root, cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(config_path) = &resolved_config.config_path {
        tracing::info!("using config: {}", config_path.display());
    }

    tracing::info!("scanning project: {}", project_root.display());
    let outcome = scan_project(&project_root, &resolved_config)?;

    let document = match cli.format {
        OutputFormat::Markdown => render_markdown(
            &outcome.functions,
            &RenderOptions {
                max_keywords: resolved_config.max_keywords,
            },
        ),
        OutputFormat::Json => render_json(&outcome.functions),
    };

    let output = resolve_output_path(cli.output, &resolved_config.output, cli.format);
    write_index(&output, &document)?;

    println!(
        "Indexed {} function(s) from {} file(s) into {}",
        outcome.functions.len(),
        outcome.files_scanned - outcome.skipped.len(),
        output.display()
    );
    if !outcome.skipped.is_empty() {
        println!("Skipped {} unreadable file(s)", outcome.skipped.len());
    }

    Ok(())
}

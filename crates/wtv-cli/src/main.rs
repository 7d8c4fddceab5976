//! CLI entry point for webpack-to-vite.
//!
//! Converts a webpack or vue-cli project into a vite project: writes
//! `vite.config.js`, adds the needed packages to `package.json` and creates
//! the `index.html` entry document.
//!
//! # Usage
//!
//! ```bash
//! # Convert a copy of ./shop into ./shop-toVite
//! wtv ./shop
//!
//! # Plain webpack project, converted in place
//! wtv -d ./admin -t webpack --cover
//!
//! # Explicit entry file
//! wtv ./shop -e src/boot.ts
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wtv_cli::convert;
use wtv_core::{Config, ProjectType};
use wtv_transform::{ProgressTick, RULE_COUNT};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Converts a webpack or vue-cli project to vite.
#[derive(Parser)]
#[command(name = "wtv", version, about, long_about = None)]
struct Cli {
    /// Project directory to convert.
    root: Option<Utf8PathBuf>,

    /// Project directory to convert (same as the positional argument).
    #[arg(short = 'd', long, env = "WTV_ROOT_DIR")]
    root_dir: Option<Utf8PathBuf>,

    /// Project type: `vue-cli` or `webpack` (default: vue-cli).
    #[arg(short = 't', long)]
    project_type: Option<ProjectType>,

    /// Entry file relative to the project root, overriding the configured one.
    #[arg(short, long)]
    entry: Option<Utf8PathBuf>,

    /// Write the converted files into the project instead of a copy.
    #[arg(short, long)]
    cover: bool,

    /// JSON configuration file; command-line flags take precedence.
    #[arg(long, env = "WTV_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
/// Logs go to stderr so they do not mix with the summary.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},ignore=warn,globset=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the optional configuration file and CLI flags.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be read or parsed.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load {}: {}", path, e))?,
        None => Config::default(),
    };

    if let Some(root) = cli.root_dir.clone().or_else(|| cli.root.clone()) {
        config.run.root_dir = root;
    }
    if config.run.root_dir.as_str().is_empty() {
        config.run.root_dir = Utf8PathBuf::from(".");
    }
    if let Some(project_type) = cli.project_type {
        config.run.project_type = project_type;
    }
    if let Some(entry) = &cli.entry {
        config.run.entry = Some(entry.clone());
    }
    config.run.cover |= cli.cover;

    Ok(config)
}

/// Creates the bar advanced once per rule.
fn create_progress_bar() -> color_eyre::Result<ProgressBar> {
    let bar = ProgressBar::new(RULE_COUNT as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("progress [{bar:40.cyan/blue}] {percent}% | {msg} | {pos}/{len}")
            .map_err(|e| color_eyre::eyre::eyre!("Invalid progress bar template: {}", e))?
            .progress_chars("#>-"),
    );
    bar.set_message("Transformation begins...");
    Ok(bar)
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Assemble the run
    let config = build_config(&cli)?;
    info!(
        root = %config.run.root_dir,
        project_type = %config.run.project_type,
        cover = config.run.cover,
        "Starting conversion"
    );

    // 5. Convert, advancing the bar per rule
    let bar = create_progress_bar()?;
    let result = convert(&config, &mut |tick: ProgressTick| {
        bar.set_position(tick.current as u64);
        bar.set_message(tick.rule);
    })
    .await;

    let summary = match result {
        Ok(summary) => {
            bar.finish_with_message("done");
            summary
        }
        Err(err) => {
            bar.abandon();
            return Err(color_eyre::eyre::eyre!(err).wrap_err("Conversion failed"));
        }
    };

    // 6. Print the summary and next steps
    let cwd = std::env::current_dir()
        .ok()
        .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
        .unwrap_or_else(|| summary.project_root.clone());
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write!(handle, "{}", summary.render(&cwd))?;

    Ok(())
}

//! rstview CLI - reStructuredText rendering with named configurations.
//!
//! Provides commands for:
//! - `render`: Render a source to HTML with a configuration
//! - `validate`: Report the diagnostics of a source
//! - `configs`: List registered configurations

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConfigsArgs, RenderArgs, ValidateArgs};
use output::Output;

/// Log filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "warn";

/// rstview - reStructuredText rendering with named configurations.
#[derive(Parser)]
#[command(name = "rstview", version, about)]
struct Cli {
    /// Path to configuration file (default: auto-discover rstview.toml).
    #[arg(short, long, global = true, env = "RSTVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output (discovery and render logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a source file to HTML.
    Render(RenderArgs),
    /// Check a source file and print its diagnostics.
    Validate(ValidateArgs),
    /// List registered configurations.
    Configs(ConfigsArgs),
}

/// --verbose enables INFO level, otherwise use `RUST_LOG` or default to WARN.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Render(args) => args.execute(config_path),
        Commands::Validate(args) => args.execute(config_path),
        Commands::Configs(args) => args.execute(config_path),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(err.exit_code());
    }
}

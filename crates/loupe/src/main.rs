//! Loupe CLI - click-to-zoom overlay for rendered diagrams.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "loupe")]
#[command(about = "Click-to-zoom overlay for rendered diagrams")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to loupe.toml config file
    #[arg(short, long, default_value = "loupe.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config and scenario
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Run one scenario
    Run {
        /// Scenario file
        scenario: PathBuf,

        /// Sleep through waits in wall-clock time
        #[arg(long)]
        realtime: bool,

        /// Write an HTML snapshot of the final page
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run every scenario under a directory
    Check {
        /// Scenario directory (defaults to config or "scenarios")
        dir: Option<PathBuf>,
    },

    /// Generate the overlay stylesheet
    Css {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip minification
        #[arg(long)]
        no_minify: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Run {
            scenario,
            realtime,
            snapshot,
            json,
        } => {
            let config = config::load_config(&cli.config)?;
            let options = commands::run::RunOptions {
                realtime,
                snapshot,
                json,
            };
            commands::run::run(&config, &scenario, options).await?;
        }
        Commands::Check { dir } => {
            let config = config::load_config(&cli.config)?;
            commands::check::run(&config, dir).await?;
        }
        Commands::Css { output, no_minify } => {
            let config = config::load_config(&cli.config)?;
            let minify = if no_minify { Some(false) } else { None };
            commands::css::run(&config, output, minify).await?;
        }
    }

    Ok(())
}

//! Kopi CLI - AI-generated Tailwind component pipeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "kopi")]
#[command(about = "Generate, store and capture AI-built Tailwind components")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to kopi.toml config file
    #[arg(short, long, default_value = "kopi.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default kopi.toml
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate components and store them
    Generate {
        /// Number of components (defaults to config)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Publish to the site repository instead of the local content directory
        #[arg(long)]
        github: bool,
    },

    /// Capture screenshots of every stored component
    Screenshots,

    /// Apply the styling pass to recently generated components
    Enhance {
        /// Only files modified within this many minutes (defaults to config)
        #[arg(short, long)]
        minutes: Option<u64>,
    },

    /// Extract a component record from a saved model response
    Extract {
        /// File containing the raw response
        file: PathBuf,
    },

    /// Write robots.txt and ads.txt
    SiteFiles {
        /// Output directory
        #[arg(short, long, default_value = "public")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Generate { count, github } => {
            commands::generate::run(&cli.config, count, github).await?;
        }
        Commands::Screenshots => {
            commands::screenshots::run(&cli.config).await?;
        }
        Commands::Enhance { minutes } => {
            commands::enhance::run(&cli.config, minutes).await?;
        }
        Commands::Extract { file } => {
            commands::extract::run(&file).await?;
        }
        Commands::SiteFiles { out } => {
            commands::site_files::run(&cli.config, &out).await?;
        }
    }

    Ok(())
}

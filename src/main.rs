use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "coursetrack")]
#[command(about = "Local watch progress and study stats for video courses")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.coursetrack/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's study line
    Today,

    /// Show the 7-day stats window
    Week {
        /// Print the rollup as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show runtime stats for one video, or the most watched ones
    Video {
        /// Video id; omit to list the top videos by time spent
        id: Option<String>,

        /// How many videos to list
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Feed recorded playback events (JSON lines) through the tracker
    Replay {
        /// File with one event per line
        file: PathBuf,
    },

    /// Delete all tracked progress
    Reset {
        /// Required to actually delete
        #[arg(long)]
        yes: bool,
    },

    /// Write a default config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Today => {
            cli::stats::today_command(config_path)?;
        }
        Commands::Week { json } => {
            cli::stats::week_command(config_path, json)?;
        }
        Commands::Video { id, limit } => {
            cli::stats::video_command(config_path, id.as_deref(), limit)?;
        }
        Commands::Replay { file } => {
            cli::replay::replay_command(config_path, &file).await?;
        }
        Commands::Reset { yes } => {
            cli::reset::reset_command(config_path, yes)?;
        }
        Commands::Init { force } => {
            cli::init::init_command(config_path, force)?;
        }
    }

    Ok(())
}

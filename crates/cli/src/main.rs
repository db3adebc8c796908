//! Thinki CLI: the main entry point.
//!
//! Commands:
//! - `serve`: start the HTTP API server
//! - `generate`: run one generation request from a JSON file
//! - `prompt`: print the prompt a request would produce
//! - `doctor`: diagnose configuration
//! - `onboard`: write a default config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thinki_core::Subject;

mod commands;

#[derive(Parser)]
#[command(
    name = "thinki",
    about = "Thinki — LLM-backed educational question generator",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the bind address
        #[arg(long)]
        host: Option<String>,

        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate questions for a request read from a JSON file
    Generate {
        /// Subject endpoint to emulate (english or math)
        #[arg(short, long)]
        subject: Subject,

        /// Path to the request JSON ("-" for stdin)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print the prompt a request would send, without calling the model
    Prompt {
        /// Subject endpoint to emulate (english or math)
        #[arg(short, long)]
        subject: Subject,

        /// Path to the request JSON ("-" for stdin)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Diagnose configuration and provider access
    Doctor,

    /// Initialize the configuration file
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Serve { host, port } => commands::serve::run(host, port).await?,
        Commands::Generate { subject, file } => commands::generate::run(subject, &file).await?,
        Commands::Prompt { subject, file } => commands::prompt::run(subject, &file).await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Onboard => commands::onboard::run().await?,
    }

    Ok(())
}

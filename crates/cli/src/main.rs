//! Cartmanify CLI, the main entry point.
//!
//! Commands:
//! - `serve`      Start the HTTP gateway
//! - `transform`  Rewrite one piece of text and print the reply
//! - `chat`       Interactive session, local or against a remote gateway
//! - `history`    List or clear the persisted transform history
//! - `onboard`    Write a default config file

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "cartmanify",
    about = "Cartmanify: rewrite anything in Eric Cartman's voice",
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
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Transform a single piece of text
    Transform {
        /// Text to rewrite
        text: String,

        /// Sensor level: mild, medium, or raw (defaults to the saved preference)
        #[arg(short, long)]
        level: Option<String>,
    },

    /// Start an interactive chat session
    Chat {
        /// Base URL of a running gateway; transforms run locally when absent
        #[arg(short, long, env = "CARTMANIFY_REMOTE")]
        remote: Option<String>,
    },

    /// Show the transform history
    History {
        /// Delete all history entries
        #[arg(long)]
        clear: bool,
    },

    /// Write a default configuration file
    Onboard,
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    if json {
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
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Transform { text, level } => commands::transform::run(text, level).await?,
        Commands::Chat { remote } => commands::chat::run(remote).await?,
        Commands::History { clear } => commands::history::run(clear).await?,
        Commands::Onboard => commands::onboard::run().await?,
    }

    Ok(())
}

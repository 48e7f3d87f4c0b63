//! nbpilot - tool-using LLM agents in the terminal

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{agent_command, ask_command, init_command, status_command};

#[derive(Parser)]
#[command(name = "nbpilot")]
#[command(about = "Tool-using LLM agents that delegate to each other")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config and workspace
    Init,
    /// Show configuration status
    Status,
    /// Ask the model once, without tools
    Ask {
        /// Message to send
        #[arg(short, long)]
        message: String,
        /// LLM backend from config (defaults to agent.provider)
        #[arg(short, long)]
        provider: Option<String>,
        /// Model override
        #[arg(long)]
        model: Option<String>,
    },
    /// Run the tool-using agent
    Agent {
        /// Message to send; omit for interactive mode
        #[arg(short, long)]
        message: Option<String>,
        /// LLM backend from config (defaults to agent.provider)
        #[arg(short, long)]
        provider: Option<String>,
        /// Model override
        #[arg(long)]
        model: Option<String>,
        /// Error budget per query
        #[arg(short = 'e', long)]
        max_errors: Option<u32>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Init => init_command().await,
        Commands::Status => status_command().await,
        Commands::Ask {
            message,
            provider,
            model,
        } => ask_command(message, provider, model).await,
        Commands::Agent {
            message,
            provider,
            model,
            max_errors,
        } => agent_command(message, provider, model, max_errors).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

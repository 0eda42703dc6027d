use anyhow::Result;
use arena_gateway::config::Config;
use arena_gateway::transport;
use arena_gateway::utils::sanitize_conversation_id;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "arena")]
#[command(author, version = arena_gateway::VERSION, about = "Arena - HTTP gateway for pluggable chat agents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: platform config dir/arena/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
    },

    /// List the registered agents
    Agents,

    /// Send a single message to an agent and print the reply
    Chat {
        /// Message to send
        message: String,

        /// Agent to use (default from config)
        #[arg(short, long)]
        agent: Option<String>,

        /// Conversation id
        #[arg(short, long, default_value = "default")]
        conversation: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Initialize logging
    let filter = if cli.verbose {
        "arena=debug,arena_gateway=debug,tower_http=debug".to_string()
    } else {
        let level = &config.logging.level;
        format!("arena={level},arena_gateway={level}")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            tracing::info!(
                "Starting HTTP server on {}:{}, model: {}",
                config.server.host,
                config.server.port,
                config.llm.model
            );
            transport::http::run_http_server(config).await?;
        }
        Commands::Agents => {
            transport::cli::run_list_agents(&config)?;
        }
        Commands::Chat {
            message,
            agent,
            conversation,
        } => {
            let conversation = sanitize_conversation_id(&conversation);
            transport::cli::run_chat_once(&config, &message, agent.as_deref(), &conversation)
                .await?;
        }
    }

    Ok(())
}

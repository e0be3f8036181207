use clap::Parser;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mcp_rat_reasoning::{
    cli::{execute_command, Cli, Commands},
    config::{Config, LogFormat},
    llm::LlmClient,
    server::{AppState, McpServer},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        command => {
            let result = execute_command(&command);
            if result.exit_code == 0 {
                println!("{}", result.message);
            } else {
                eprintln!("{}", result.message);
            }
            std::process::exit(result.exit_code);
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "MCP RAT Reasoning Server starting..."
    );

    if config.llm.api_key.is_none() {
        info!("OPENAI_API_KEY not set, requests will be sent without authorization");
    }

    // Initialize reasoning collaborator client
    let client = match LlmClient::new(&config.llm, config.request.clone()) {
        Ok(c) => {
            info!(
                base_url = %config.llm.base_url,
                model = %config.llm.model,
                "LLM client initialized"
            );
            c
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize LLM client");
            return Err(e.into());
        }
    };

    // Create application state
    let state = Arc::new(AppState::new(config, Arc::new(client)));

    // Start MCP server
    let server = McpServer::new(state);

    info!("Server ready, waiting for requests on stdin...");

    if let Err(e) = server.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

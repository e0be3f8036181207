//! Command-line interface.
//!
//! The binary runs the stdio MCP server by default; the other subcommands
//! are offline helpers that never contact the reasoning collaborator.

use clap::{Parser, Subcommand};

use crate::complexity::{ComplexityEstimator, DEFAULT_DOMAIN};
use crate::modes::ApproachSelector;
use crate::server::list_tools;

/// Top-level command line.
#[derive(Parser, Debug)]
#[command(name = "mcp-rat-reasoning", version, about = "MCP server for scored thought chains and Chain of Draft solving")]
pub struct Cli {
    /// Subcommand to run; defaults to `serve`.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the MCP server over stdio
    Serve,

    /// List the registered tool names
    Tools,

    /// Analyze a problem's complexity without solving it
    Analyze {
        /// The problem statement
        problem: String,

        /// Problem domain: math, logic, code or general
        #[arg(long, default_value = DEFAULT_DOMAIN)]
        domain: String,
    },
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

/// Execute an offline command. `serve` is run by the binary itself.
pub fn execute_command(command: &Commands) -> CliResult {
    match command {
        Commands::Serve => CliResult::error("serve is handled by the server entry point"),
        Commands::Tools => execute_tools(),
        Commands::Analyze { problem, domain } => execute_analyze(problem, domain),
    }
}

fn execute_tools() -> CliResult {
    let names: Vec<String> = list_tools().into_iter().map(|tool| tool.name).collect();
    CliResult::success(names.join("\n"))
}

fn execute_analyze(problem: &str, domain: &str) -> CliResult {
    if problem.trim().is_empty() {
        return CliResult::error("Problem cannot be empty");
    }

    let overview = ApproachSelector::new().overview(&ComplexityEstimator::new(), problem, domain);
    match serde_json::to_string_pretty(&overview) {
        Ok(json) => CliResult::success(json),
        Err(e) => CliResult::error(format!("Failed to serialize analysis: {}", e)),
    }
}

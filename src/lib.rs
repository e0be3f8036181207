//! # MCP RAT Reasoning Server
//!
//! A Model Context Protocol (MCP) server for structured reasoning. It scores
//! caller-driven thought chains and solves problems with Chain of Draft or
//! Chain of Thought prompting against an OpenAI-compatible model.
//!
//! ## Features
//!
//! - **Thought chains**: Sanitized, scored, append-only reasoning steps with
//!   revisions, branches and rolling session analytics
//! - **Complexity estimation**: Lexical problem scoring with per-domain keyword tables
//! - **Approach selection**: Chain of Draft above a complexity threshold, Chain of
//!   Thought below, with an adaptive per-step word budget
//! - **Solving**: One collaborator call per problem, parsed into steps and a final answer
//! - **Performance tracking**: Per-domain token, latency and accuracy averages and
//!   draft-vs-step token reduction
//!
//! ## Architecture
//!
//! ```text
//! MCP Client → MCP Server (Rust) → Chat Completions API (HTTP)
//!                    ↓
//!            In-memory session stores
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mcp_rat_reasoning::{Config, AppState, McpServer};
//! use mcp_rat_reasoning::llm::LlmClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = LlmClient::new(&config.llm, config.request.clone())?;
//!     let state = Arc::new(AppState::new(config, Arc::new(client)));
//!     let server = McpServer::new(state);
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Command-line interface for the server binary.
pub mod cli;
/// Problem complexity estimation.
pub mod complexity;
/// Configuration management for the MCP server.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Chat-completions client and the reasoning collaborator seam.
pub mod llm;
/// Thought scoring, sanitation and session analytics.
pub mod metrics;
/// Reasoning modes: thought chains and Chain of Draft solving.
pub mod modes;
/// Prompt templates for the solver tools.
pub mod prompts;
/// MCP server implementation and request handling.
pub mod server;
/// In-memory thought history and performance stores.
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use server::{AppState, McpServer, SharedState};

//! Server module for MCP protocol handling.
//!
//! This module provides:
//! - MCP server implementation over stdio
//! - Tool call handlers and routing
//! - Shared application state management

mod handlers;
mod mcp;

pub use handlers::*;
pub use mcp::*;

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::complexity::ComplexityEstimator;
use crate::config::Config;
use crate::llm::ReasoningBackend;
use crate::modes::{ApproachSelector, DraftMode, ThoughtMode};
use crate::storage::PerformanceStore;

/// Application state shared across handlers.
///
/// Built once at startup. The thought session and the performance store
/// each carry their own lock, so a pending collaborator call never blocks
/// thought-chain requests.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Thought-chain mode handler.
    pub thought_mode: ThoughtMode,
    /// Chain of Draft / Chain of Thought solver.
    pub draft_mode: DraftMode,
    /// Problem complexity estimator.
    pub estimator: ComplexityEstimator,
    /// Approach and word-budget selector.
    pub selector: ApproachSelector,
    /// Solved-problem log shared with the solver.
    pub performance: Arc<RwLock<PerformanceStore>>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, backend: Arc<dyn ReasoningBackend>) -> Self {
        tracing::info!(
            model = %config.llm.model,
            base_url = %config.llm.base_url,
            "AppState initializing"
        );

        let performance = Arc::new(RwLock::new(PerformanceStore::new()));
        let draft_mode = DraftMode::new(backend, Arc::clone(&performance));

        Self {
            config,
            thought_mode: ThoughtMode::new(),
            draft_mode,
            estimator: ComplexityEstimator::new(),
            selector: ApproachSelector::new(),
            performance,
        }
    }
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;

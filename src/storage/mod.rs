//! In-memory session stores.
//!
//! This module provides the append-only thought history with its branch
//! index, and the per-domain performance log for solved problems. All state
//! lives for the lifetime of the process and is never persisted.

mod performance;
mod thoughts;


pub use performance::*;
pub use thoughts::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::Metrics;
use crate::modes::Approach;

/// One submitted, sanitized and scored reasoning step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThoughtRecord {
    /// Sanitized thought text (never empty).
    pub content: String,
    /// Position in the chain (1-based).
    pub thought_number: u32,
    /// Current estimate of chain length; raised when the chain is extended.
    pub total_thoughts: u32,
    /// Whether the caller intends to submit another thought.
    pub next_needed: bool,
    /// Whether this thought reconsiders an earlier one.
    pub is_revision: bool,
    /// The thought number being reconsidered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revises_thought: Option<u32>,
    /// The thought number this branch diverges from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_from: Option<u32>,
    /// Branch this thought belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    /// Whether the caller asked to extend the chain past `total_thoughts`.
    pub needs_more_thoughts: bool,
    /// When the thought was accepted.
    pub timestamp: DateTime<Utc>,
    /// Heuristic scores.
    pub metrics: Metrics,
    /// Set once metrics have been computed.
    pub processed: bool,
}

impl ThoughtRecord {
    /// Short label used for the rendered title line.
    pub fn kind(&self) -> ThoughtKind {
        if self.is_revision {
            ThoughtKind::Revision
        } else if self.branch_id.is_some() {
            ThoughtKind::Branch
        } else {
            ThoughtKind::Plain
        }
    }
}

#[cfg(test)]
impl ThoughtRecord {
    pub(crate) fn for_test(content: &str, thought_number: u32, total_thoughts: u32) -> Self {
        Self {
            content: content.to_string(),
            thought_number,
            total_thoughts,
            next_needed: true,
            is_revision: false,
            revises_thought: None,
            branch_from: None,
            branch_id: None,
            needs_more_thoughts: false,
            timestamp: Utc::now(),
            metrics: Metrics::default(),
            processed: true,
        }
    }
}

/// How a thought relates to the rest of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThoughtKind {
    /// A regular step in the main chain.
    Plain,
    /// Reconsiders an earlier thought.
    Revision,
    /// Continues a named branch.
    Branch,
}

impl std::fmt::Display for ThoughtKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThoughtKind::Plain => write!(f, "plain"),
            ThoughtKind::Revision => write!(f, "revision"),
            ThoughtKind::Branch => write!(f, "branch"),
        }
    }
}

/// One solved problem as recorded by the solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionOutcome {
    /// Unique outcome identifier.
    pub id: Uuid,
    /// The problem statement.
    pub problem: String,
    /// Normalized domain name.
    pub domain: String,
    /// Reasoning approach used.
    pub approach: Approach,
    /// Per-step word budget given to the model.
    pub word_limit: u32,
    /// Draft/step/comparison lines in response order.
    pub reasoning_steps: Vec<String>,
    /// Final answer text.
    pub final_answer: String,
    /// Estimated token count of the raw response.
    pub token_count: u64,
    /// Wall-clock latency of the model call.
    pub execution_time_ms: u64,
    /// Complexity score of the problem statement.
    pub complexity: u32,
    /// Accuracy score attached after the fact, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// When the outcome was produced.
    pub created_at: DateTime<Utc>,
}

//! Reasoning mode implementations.
//!
//! This module provides the two tool-facing reasoning modes:
//! - [`ThoughtMode`]: Scored, append-only thought chains with revisions and branches
//! - [`DraftMode`]: Single-shot Chain of Draft / Chain of Thought problem solving
//!
//! [`ApproachSelector`] decides which [`Approach`] and word budget a solve uses.

mod display;
mod draft;
mod selector;
mod thought;

pub use display::*;
pub use draft::*;
pub use selector::*;
pub use thought::*;

use serde::{Deserialize, Serialize};

/// Reasoning approach requested from the collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Approach {
    /// Several short drafts followed by a comparison.
    #[serde(rename = "CoD")]
    ChainOfDraft,
    /// Sequential numbered steps.
    #[serde(rename = "CoT")]
    ChainOfThought,
}

impl Approach {
    /// Get the short name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Approach::ChainOfDraft => "CoD",
            Approach::ChainOfThought => "CoT",
        }
    }

    /// Long human-readable name.
    pub fn full_name(&self) -> &'static str {
        match self {
            Approach::ChainOfDraft => "Chain of Draft",
            Approach::ChainOfThought => "Chain of Thought",
        }
    }
}

impl std::fmt::Display for Approach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Approach {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cod" | "chain_of_draft" | "chain of draft" => Ok(Approach::ChainOfDraft),
            "cot" | "chain_of_thought" | "chain of thought" => Ok(Approach::ChainOfThought),
            _ => Err(format!("Unknown approach: {}", s)),
        }
    }
}

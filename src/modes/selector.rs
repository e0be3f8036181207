use serde::{Deserialize, Serialize};

use super::Approach;
use crate::complexity::{AdvisoryRecommendation, ComplexityEstimator, ComplexityReport};

/// Complexity above which drafts are preferred over steps.
pub const DRAFT_THRESHOLD: u32 = 100;

/// Word budget when neither an override nor adaptation applies.
pub const DEFAULT_WORD_LIMIT: u32 = 100;

/// Lower bound of the adaptive word budget.
pub const MIN_ADAPTIVE_WORD_LIMIT: u32 = 50;

/// Upper bound of the adaptive word budget.
pub const MAX_ADAPTIVE_WORD_LIMIT: u32 = 150;

/// Approach and per-step word budget chosen for a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub approach: Approach,
    pub word_limit: u32,
}

/// Complexity analysis with the selection a solve would make.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityOverview {
    pub analysis: ComplexityReport,
    /// What the solve path would use.
    pub selection: Selection,
    /// Three-tier recommendation, reported only.
    pub advisory: AdvisoryRecommendation,
}

/// Picks the approach and word budget for a problem.
///
/// This is the authoritative rule on the solve path. The estimator's
/// three-tier recommendation is reported alongside but never consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproachSelector;

impl ApproachSelector {
    /// Create a new selector
    pub fn new() -> Self {
        Self
    }

    /// Overrides win; otherwise drafts above [`DRAFT_THRESHOLD`] and a word
    /// budget of `clamp(complexity, 50, 150)` when adaptive, else
    /// [`DEFAULT_WORD_LIMIT`].
    pub fn select(
        &self,
        complexity: u32,
        approach: Option<Approach>,
        word_limit: Option<u32>,
        adaptive: bool,
    ) -> Selection {
        let approach = approach.unwrap_or(if complexity > DRAFT_THRESHOLD {
            Approach::ChainOfDraft
        } else {
            Approach::ChainOfThought
        });

        let word_limit = match word_limit {
            Some(limit) => limit,
            None if adaptive => complexity.clamp(MIN_ADAPTIVE_WORD_LIMIT, MAX_ADAPTIVE_WORD_LIMIT),
            None => DEFAULT_WORD_LIMIT,
        };

        Selection {
            approach,
            word_limit,
        }
    }

    /// Analyze `problem` and report the adaptive selection and the advisory
    /// recommendation side by side. Makes no collaborator call.
    pub fn overview(
        &self,
        estimator: &ComplexityEstimator,
        problem: &str,
        domain: &str,
    ) -> ComplexityOverview {
        let analysis = estimator.analyze(problem, domain);
        let selection = self.select(analysis.estimated_complexity, None, None, true);
        let advisory = estimator.recommend_approach(analysis.estimated_complexity);

        ComplexityOverview {
            analysis,
            selection,
            advisory,
        }
    }
}

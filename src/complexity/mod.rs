//! Lexical complexity estimation for problem statements.
//!
//! The estimate drives approach selection and the adaptive word budget on the
//! solve path. It is a pure function of the text, the domain and a fixed
//! keyword table.

use serde::{Deserialize, Serialize};

use crate::metrics::sentence_count;
use crate::modes::Approach;

/// Domain used when none is given or the given one has no keyword table.
pub const DEFAULT_DOMAIN: &str = "general";

/// Starting score before any adjustment.
pub const BASE_COMPLEXITY: u32 = 50;

/// Upper bound on the estimate.
pub const MAX_COMPLEXITY: u32 = 200;

const MATH_INDICATORS: &[&str] = &[
    "integral",
    "derivative",
    "equation",
    "theorem",
    "proof",
    "matrix",
    "polynomial",
    "differential",
    "calculus",
    "algebra",
    "geometry",
    "probability",
    "statistics",
    "optimization",
    "function",
];

const LOGIC_INDICATORS: &[&str] = &[
    "premise",
    "conclusion",
    "syllogism",
    "logical",
    "reasoning",
    "argument",
    "fallacy",
    "valid",
    "sound",
    "deduction",
    "induction",
    "contradiction",
    "paradox",
    "boolean",
    "inference",
];

const CODE_INDICATORS: &[&str] = &[
    "algorithm",
    "function",
    "class",
    "method",
    "recursion",
    "iteration",
    "complexity",
    "runtime",
    "memory",
    "optimization",
    "debug",
    "compile",
    "syntax",
    "error",
    "exception",
    "api",
];

const GENERAL_INDICATORS: &[&str] = &[
    "analyze",
    "compare",
    "evaluate",
    "synthesize",
    "complex",
    "multiple",
    "various",
    "several",
    "relationship",
    "interaction",
    "consequence",
    "implication",
    "factor",
    "variable",
    "constraint",
];

/// Lowercase and trim a caller-supplied domain; blank becomes [`DEFAULT_DOMAIN`].
pub fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim().to_lowercase();
    if domain.is_empty() {
        DEFAULT_DOMAIN.to_string()
    } else {
        domain
    }
}

/// Result of analyzing a problem statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityReport {
    /// Domain the analysis was run for.
    pub domain: String,
    pub word_count: usize,
    pub sentence_count: usize,
    pub words_per_sentence: f64,
    pub indicator_count: usize,
    /// Matched indicator keywords in table order.
    pub found_indicators: Vec<String>,
    /// Literal `?` characters in the text.
    pub question_count: usize,
    pub estimated_complexity: u32,
}

/// Three-tier recommendation kept for reporting only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryRecommendation {
    pub approach: Approach,
    pub reason: String,
    pub word_limit: u32,
}

/// Scores problem statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityEstimator;

impl ComplexityEstimator {
    /// Create a new estimator
    pub fn new() -> Self {
        Self
    }

    /// Keyword table for `domain`, falling back to the general table.
    pub fn indicators(&self, domain: &str) -> &'static [&'static str] {
        match domain {
            "math" => MATH_INDICATORS,
            "logic" => LOGIC_INDICATORS,
            "code" => CODE_INDICATORS,
            _ => GENERAL_INDICATORS,
        }
    }

    /// Analyze `problem` for `domain`.
    ///
    /// Starting from [`BASE_COMPLEXITY`]: +20 above 50 words and +30 more above
    /// 100; +15 above 15 words per sentence and +25 more above 25; +10 per
    /// distinct indicator; +15 per `?`; a domain bonus (math 20, logic 15,
    /// code 25). Capped at [`MAX_COMPLEXITY`].
    pub fn analyze(&self, problem: &str, domain: &str) -> ComplexityReport {
        let domain = normalize_domain(domain);
        let text = problem.to_lowercase();

        let word_count = text.split_whitespace().count();
        let sentence_count = sentence_count(&text);
        let words_per_sentence = word_count as f64 / sentence_count.max(1) as f64;

        let found_indicators: Vec<String> = self
            .indicators(&domain)
            .iter()
            .filter(|indicator| text.contains(*indicator))
            .map(|indicator| indicator.to_string())
            .collect();
        let indicator_count = found_indicators.len();

        let question_count = text.matches('?').count();

        let mut score = BASE_COMPLEXITY as usize;
        if word_count > 50 {
            score += 20;
        }
        if word_count > 100 {
            score += 30;
        }
        if words_per_sentence > 15.0 {
            score += 15;
        }
        if words_per_sentence > 25.0 {
            score += 25;
        }
        score += indicator_count * 10;
        score += question_count * 15;
        score += domain_bonus(&domain) as usize;

        let estimated_complexity = score.min(MAX_COMPLEXITY as usize) as u32;

        ComplexityReport {
            domain,
            word_count,
            sentence_count,
            words_per_sentence,
            indicator_count,
            found_indicators,
            question_count,
            estimated_complexity,
        }
    }

    /// Three-tier advisory recommendation (thresholds 80 and 120).
    ///
    /// Not used to pick the solve approach: [`crate::modes::ApproachSelector`]
    /// applies a single threshold at 100 and is authoritative. The two rules
    /// disagree for scores in `101..=120`.
    pub fn recommend_approach(&self, complexity: u32) -> AdvisoryRecommendation {
        let (approach, reason) = if complexity > 120 {
            (
                Approach::ChainOfDraft,
                "High complexity benefits from draft iteration",
            )
        } else if complexity > 80 {
            (
                Approach::ChainOfThought,
                "Medium complexity suitable for step-by-step reasoning",
            )
        } else {
            (
                Approach::ChainOfThought,
                "Low complexity can be solved directly",
            )
        };

        AdvisoryRecommendation {
            approach,
            reason: reason.to_string(),
            word_limit: self.recommend_word_limit(complexity),
        }
    }

    /// Stepped advisory word budget: 150 / 120 / 100 / 75.
    pub fn recommend_word_limit(&self, complexity: u32) -> u32 {
        match complexity {
            c if c > 150 => 150,
            c if c > 100 => 120,
            c if c > 75 => 100,
            _ => 75,
        }
    }
}

fn domain_bonus(domain: &str) -> u32 {
    match domain {
        "math" => 20,
        "logic" => 15,
        "code" => 25,
        _ => 0,
    }
}

//! Heuristic scoring of thought steps and session analytics.
//!
//! Every score here is a shallow lexical measure: punctuation weights,
//! keyword hits and a handful of regular expressions. Nothing attempts to
//! judge whether the reasoning is correct.

mod analytics;
mod sanitize;

pub use analytics::*;
pub use sanitize::*;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Words that mark an explicit inference step.
pub const REASONING_KEYWORDS: &[&str] = &[
    "because",
    "therefore",
    "thus",
    "hence",
    "consequently",
    "since",
    "given",
    "assuming",
    "implies",
    "suggests",
    "indicates",
    "demonstrates",
    "proves",
    "shows",
    "reveals",
];

/// Words that flag a step as weighty.
pub const IMPACT_KEYWORDS: &[&str] = &[
    "important",
    "critical",
    "significant",
    "key",
    "essential",
    "fundamental",
    "crucial",
    "vital",
    "major",
    "primary",
];

static STRUCTURE_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"\b(first|second|third|finally|lastly)\b").expect("valid regex"),
        Regex::new(r"\b(step \d+|\d+\.|\d+\))").expect("valid regex"),
        Regex::new(r"\b(therefore|thus|hence|consequently)\b").expect("valid regex"),
    ]
});

static CERTAINTY_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"\b(clearly|obviously|definitely|certainly|undoubtedly)\b")
            .expect("valid regex"),
        Regex::new(r"\b(proven|established|confirmed)\b").expect("valid regex"),
    ]
});

static UNCERTAINTY_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"\b(maybe|perhaps|possibly|might|could be|uncertain)\b").expect("valid regex"),
        Regex::new(r"\b(not sure|unclear|ambiguous)\b").expect("valid regex"),
    ]
});

const REVISION_BONUS: f64 = 1.10;
const BRANCH_BONUS: f64 = 1.05;

/// Five bounded scores for a single thought, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Punctuation and sentence structure density.
    pub complexity: f64,
    /// Length-based depth.
    pub depth: f64,
    /// Weighted blend of complexity, depth and impact with revision/branch bonuses.
    pub quality: f64,
    /// Reasoning and emphasis keyword density.
    pub impact: f64,
    /// Structural confidence shifted by certainty/uncertainty language.
    pub confidence: f64,
}

impl Metrics {
    /// All five values in declaration order.
    pub fn values(&self) -> [f64; 5] {
        [
            self.complexity,
            self.depth,
            self.quality,
            self.impact,
            self.confidence,
        ]
    }
}

/// Scores thought content.
///
/// Stateless; the keyword tables and patterns are process-wide constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsEngine;

impl MetricsEngine {
    /// Create a new engine
    pub fn new() -> Self {
        Self
    }

    /// Score already-sanitized content.
    ///
    /// Values are rounded to three decimals. Quality is derived from the
    /// unrounded sub-scores.
    pub fn score(&self, content: &str, is_revision: bool, branch_id: Option<&str>) -> Metrics {
        let lower = content.to_lowercase();

        let complexity = structural_complexity(content);
        let depth = depth(content);
        let impact = impact(&lower);
        let quality = quality(complexity, depth, impact, is_revision, branch_id.is_some());
        let confidence = confidence(&lower, complexity, depth);

        Metrics {
            complexity: round3(complexity),
            depth: round3(depth),
            quality: round3(quality),
            impact: round3(impact),
            confidence: round3(confidence),
        }
    }
}

/// Count of non-empty fragments when splitting on `.`, `!` and `?`.
pub(crate) fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
}

fn structural_complexity(content: &str) -> f64 {
    let mut punctuation = 0.0;
    for c in content.chars() {
        punctuation += match c {
            ':' => 0.3,
            ';' => 0.2,
            '-' => 0.1,
            '(' | ')' => 0.05,
            '?' => 0.2,
            _ => 0.0,
        };
    }
    let sentences = sentence_count(content) as f64 * 0.1;

    ((punctuation + sentences) / 10.0).min(1.0)
}

fn depth(content: &str) -> f64 {
    let words = content.split_whitespace().count() as f64;
    let chars = content.chars().count() as f64;

    0.6 * (words / 100.0).min(1.0) + 0.4 * (chars / 500.0).min(1.0)
}

fn impact(lower: &str) -> f64 {
    let reasoning = count_contained(lower, REASONING_KEYWORDS);
    let emphasis = count_contained(lower, IMPACT_KEYWORDS);
    let structure = count_matching(lower, STRUCTURE_PATTERNS.as_slice());

    ((reasoning + emphasis + structure) as f64 / 8.0).min(1.0)
}

fn quality(complexity: f64, depth: f64, impact: f64, is_revision: bool, in_branch: bool) -> f64 {
    let mut quality = 0.3 * complexity + 0.4 * depth + 0.3 * impact;
    if is_revision {
        quality *= REVISION_BONUS;
    }
    if in_branch {
        quality *= BRANCH_BONUS;
    }
    quality.min(1.0)
}

fn confidence(lower: &str, complexity: f64, depth: f64) -> f64 {
    let certainty = count_matching(lower, CERTAINTY_PATTERNS.as_slice()) as f64;
    let uncertainty = count_matching(lower, UNCERTAINTY_PATTERNS.as_slice()) as f64;

    let structural = (complexity + depth) / 2.0;
    (structural + 0.1 * (certainty - uncertainty)).clamp(0.0, 1.0)
}

fn count_contained(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|kw| text.contains(*kw)).count()
}

fn count_matching(text: &str, patterns: &[Regex]) -> usize {
    patterns.iter().filter(|p| p.is_match(text)).count()
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

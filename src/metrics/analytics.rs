use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::storage::ThoughtRecord;

/// Number of trailing quality scores kept for trend analysis.
pub const QUALITY_WINDOW: usize = 20;

/// Entries averaged at each end of the window for the effectiveness trend.
const TREND_SPAN: usize = 5;

/// Reported branch success rate once any branch exists.
///
/// This is a fixed stub, not a measurement: nothing in a thought chain says
/// whether a branch succeeded.
pub const BRANCH_SUCCESS_PLACEHOLDER: f64 = 0.7;

/// Session-wide rolling analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    /// Thoughts observed so far.
    pub total_thoughts: u64,
    /// Thoughts flagged as revisions.
    pub total_revisions: u64,
    /// Thoughts carrying a branch id.
    pub total_branches: u64,
    /// Last [`QUALITY_WINDOW`] quality scores, oldest first.
    pub quality_trend: Vec<f64>,
    /// Mean of `quality_trend`.
    pub average_quality: f64,
    /// Relative improvement of the last five window entries over the first five.
    pub chain_effectiveness: f64,
    /// `min(1, 2 * revisions / total)`.
    pub revision_impact: f64,
    /// See [`BRANCH_SUCCESS_PLACEHOLDER`].
    pub branch_success_rate: f64,
    pub session_start: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

/// Incrementally maintains an [`AnalyticsSnapshot`].
#[derive(Debug, Clone)]
pub struct AnalyticsAggregator {
    total_thoughts: u64,
    total_revisions: u64,
    total_branches: u64,
    window: VecDeque<f64>,
    average_quality: f64,
    chain_effectiveness: f64,
    revision_impact: f64,
    branch_success_rate: f64,
    session_start: DateTime<Utc>,
    last_update: DateTime<Utc>,
}

impl Default for AnalyticsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsAggregator {
    /// Start a fresh session
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            total_thoughts: 0,
            total_revisions: 0,
            total_branches: 0,
            window: VecDeque::with_capacity(QUALITY_WINDOW + 1),
            average_quality: 0.0,
            chain_effectiveness: 0.0,
            revision_impact: 0.0,
            branch_success_rate: 0.0,
            session_start: now,
            last_update: now,
        }
    }

    /// Fold a newly scored thought into the running statistics.
    pub fn observe(&mut self, record: &ThoughtRecord) -> AnalyticsSnapshot {
        self.total_thoughts += 1;
        self.last_update = Utc::now();

        if record.is_revision {
            self.total_revisions += 1;
        }
        if record.branch_id.is_some() {
            self.total_branches += 1;
        }

        self.window.push_back(record.metrics.quality);
        while self.window.len() > QUALITY_WINDOW {
            self.window.pop_front();
        }
        self.average_quality = mean(self.window.iter().copied());

        self.update_trends();
        self.snapshot()
    }

    fn update_trends(&mut self) {
        let len = self.window.len();
        let first = mean(self.window.iter().take(TREND_SPAN).copied());
        let last = mean(self.window.iter().skip(len.saturating_sub(TREND_SPAN)).copied());
        if first > 0.0 {
            self.chain_effectiveness = ((last - first) / first).max(0.0);
        }

        if self.total_thoughts > 0 {
            self.revision_impact =
                (2.0 * self.total_revisions as f64 / self.total_thoughts as f64).min(1.0);
        }

        if self.total_branches > 0 {
            self.branch_success_rate = BRANCH_SUCCESS_PLACEHOLDER;
        }
    }

    /// Current state without observing anything.
    pub fn snapshot(&self) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            total_thoughts: self.total_thoughts,
            total_revisions: self.total_revisions,
            total_branches: self.total_branches,
            quality_trend: self.window.iter().copied().collect(),
            average_quality: self.average_quality,
            chain_effectiveness: self.chain_effectiveness,
            revision_impact: self.revision_impact,
            branch_success_rate: self.branch_success_rate,
            session_start: self.session_start,
            last_update: self.last_update,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

use super::SolutionOutcome;
use crate::error::ToolError;
use crate::modes::Approach;

/// Running totals for one `(domain, approach)` pair.
#[derive(Debug, Clone, Default)]
struct PerformanceTotals {
    total_tokens: u64,
    total_time_ms: u64,
    count: u64,
    accuracy_sum: f64,
    accuracy_count: u64,
}

/// Averages for one `(domain, approach)` pair, derived on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStat {
    pub domain: String,
    pub approach: Approach,
    pub avg_tokens: f64,
    pub avg_time_ms: f64,
    /// Mean of recorded accuracy scores; `None` until one is recorded.
    pub accuracy: Option<f64>,
    pub count: u64,
}

/// Draft-vs-step token comparison for one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenReduction {
    pub domain: String,
    pub cod_avg_tokens: f64,
    pub cot_avg_tokens: f64,
    /// `(cot - cod) / cot * 100`; negative when drafts cost more.
    pub reduction_percentage: f64,
    /// Outcomes recorded for the domain across both approaches.
    pub count: usize,
}

/// Outcome log plus per-`(domain, approach)` running totals.
#[derive(Debug, Default)]
pub struct PerformanceStore {
    outcomes: Vec<SolutionOutcome>,
    totals: BTreeMap<(String, Approach), PerformanceTotals>,
}

impl PerformanceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome and fold it into its pair's totals.
    pub fn record(&mut self, outcome: SolutionOutcome) -> Uuid {
        let id = outcome.id;
        let totals = self
            .totals
            .entry((outcome.domain.clone(), outcome.approach))
            .or_default();
        totals.total_tokens += outcome.token_count;
        totals.total_time_ms += outcome.execution_time_ms;
        totals.count += 1;
        if let Some(accuracy) = outcome.accuracy {
            totals.accuracy_sum += accuracy;
            totals.accuracy_count += 1;
        }

        debug!(
            outcome_id = %id,
            domain = %outcome.domain,
            approach = %outcome.approach,
            tokens = outcome.token_count,
            "Outcome recorded"
        );

        self.outcomes.push(outcome);
        id
    }

    /// Attach (or replace) an accuracy score in `[0, 1]` on a recorded outcome.
    pub fn record_accuracy(&mut self, outcome_id: Uuid, accuracy: f64) -> Result<(), ToolError> {
        if !(0.0..=1.0).contains(&accuracy) {
            return Err(ToolError::validation(
                "accuracy",
                "must be between 0.0 and 1.0",
            ));
        }

        let outcome = self
            .outcomes
            .iter_mut()
            .find(|o| o.id == outcome_id)
            .ok_or_else(|| ToolError::UnknownOutcome {
                outcome_id: outcome_id.to_string(),
            })?;

        let previous = outcome.accuracy.replace(accuracy);
        let totals = self
            .totals
            .entry((outcome.domain.clone(), outcome.approach))
            .or_default();
        match previous {
            Some(old) => totals.accuracy_sum += accuracy - old,
            None => {
                totals.accuracy_sum += accuracy;
                totals.accuracy_count += 1;
            }
        }
        Ok(())
    }

    /// Every recorded outcome in order.
    pub fn outcomes(&self) -> &[SolutionOutcome] {
        &self.outcomes
    }

    /// Averages per `(domain, approach)`, optionally for a single domain.
    pub fn stats_by_domain(&self, domain: Option<&str>) -> Vec<PerformanceStat> {
        self.totals
            .iter()
            .filter(|((d, _), _)| domain.map_or(true, |wanted| d == wanted))
            .map(|((d, approach), t)| PerformanceStat {
                domain: d.clone(),
                approach: *approach,
                avg_tokens: t.total_tokens as f64 / t.count as f64,
                avg_time_ms: t.total_time_ms as f64 / t.count as f64,
                accuracy: (t.accuracy_count > 0).then(|| t.accuracy_sum / t.accuracy_count as f64),
                count: t.count,
            })
            .collect()
    }

    /// Token reduction of drafts over steps, for domains holding samples of both.
    pub fn token_reduction(&self) -> Vec<TokenReduction> {
        let mut by_domain: BTreeMap<&str, (Option<f64>, Option<f64>)> = BTreeMap::new();
        for ((domain, approach), t) in &self.totals {
            let avg = t.total_tokens as f64 / t.count as f64;
            let entry = by_domain.entry(domain.as_str()).or_default();
            match approach {
                Approach::ChainOfDraft => entry.0 = Some(avg),
                Approach::ChainOfThought => entry.1 = Some(avg),
            }
        }

        by_domain
            .into_iter()
            .filter_map(|(domain, pair)| match pair {
                (Some(cod), Some(cot)) if cot > 0.0 => Some(TokenReduction {
                    domain: domain.to_string(),
                    cod_avg_tokens: cod,
                    cot_avg_tokens: cot,
                    reduction_percentage: (cot - cod) / cot * 100.0,
                    count: self.outcomes.iter().filter(|o| o.domain == domain).count(),
                }),
                _ => None,
            })
            .collect()
    }
}

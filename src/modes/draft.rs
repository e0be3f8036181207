use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::{Approach, ApproachSelector, Selection};
use crate::complexity::{normalize_domain, ComplexityEstimator, DEFAULT_DOMAIN};
use crate::error::{AppError, AppResult, ToolError};
use crate::llm::ReasoningBackend;
use crate::prompts::{build_solve_prompt, FINAL_ANSWER_MARKER, NO_FINAL_ANSWER, STEP_MARKERS};
use crate::storage::{PerformanceStore, SolutionOutcome};

/// Input parameters for the solver tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveParams {
    /// The problem statement
    pub problem: String,
    /// Problem domain (`math`, `logic`, `code` or anything else)
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Approach override (`CoD` or `CoT`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approach: Option<String>,
    /// Per-step word budget override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_words_per_step: Option<f64>,
    /// State the word budget in the prompt
    #[serde(default = "default_true")]
    pub enforce_format: bool,
    /// Derive the word budget from complexity when not overridden
    #[serde(default = "default_true")]
    pub adaptive_word_limit: bool,
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

fn default_true() -> bool {
    true
}

impl SolveParams {
    /// Params with every option at its default
    pub fn new(problem: impl Into<String>) -> Self {
        Self {
            problem: problem.into(),
            domain: default_domain(),
            approach: None,
            max_words_per_step: None,
            enforce_format: true,
            adaptive_word_limit: true,
        }
    }

    /// Set the domain
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Force an approach
    pub fn with_approach(mut self, approach: impl Into<String>) -> Self {
        self.approach = Some(approach.into());
        self
    }

    /// Force a per-step word budget
    pub fn with_word_limit(mut self, words: f64) -> Self {
        self.max_words_per_step = Some(words);
        self
    }

    fn approach_override(&self) -> Result<Option<Approach>, ToolError> {
        match self.approach.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => name
                .parse()
                .map(Some)
                .map_err(|_| ToolError::validation("approach", "Must be one of: CoD, CoT")),
        }
    }

    fn word_limit_override(&self) -> Result<Option<u32>, ToolError> {
        match self.max_words_per_step {
            None => Ok(None),
            Some(words) if words.is_finite() && words >= 1.0 => {
                Ok(Some(words.round().min(u32::MAX as f64) as u32))
            }
            Some(_) => Err(ToolError::validation(
                "max_words_per_step",
                "Must be a positive number",
            )),
        }
    }
}

/// Reasoning lines and answer pulled out of a collaborator reply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedResponse {
    pub reasoning_steps: Vec<String>,
    pub final_answer: String,
}

/// Collect marker lines in order and take the last final-answer line.
pub fn parse_response(content: &str) -> ParsedResponse {
    let mut reasoning_steps = Vec::new();
    let mut final_answer = None;

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(answer) = line.strip_prefix(FINAL_ANSWER_MARKER) {
            final_answer = Some(answer.trim().to_string());
        } else if STEP_MARKERS.iter().any(|marker| line.starts_with(marker)) {
            reasoning_steps.push(line.to_string());
        }
    }

    ParsedResponse {
        reasoning_steps,
        final_answer: final_answer
            .filter(|answer| !answer.is_empty())
            .unwrap_or_else(|| NO_FINAL_ANSWER.to_string()),
    }
}

/// Rough token estimate: one token per four characters, rounded up.
pub fn estimate_tokens(text: &str) -> u64 {
    let chars = text.chars().count() as u64;
    (chars + 3) / 4
}

/// Result of a solver tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResult {
    pub outcome_id: Uuid,
    pub domain: String,
    pub approach: Approach,
    pub word_limit: u32,
    pub reasoning_steps: Vec<String>,
    pub final_answer: String,
    pub token_count: u64,
    pub execution_time_ms: u64,
    pub complexity: u32,
}

impl From<&SolutionOutcome> for SolveResult {
    fn from(outcome: &SolutionOutcome) -> Self {
        Self {
            outcome_id: outcome.id,
            domain: outcome.domain.clone(),
            approach: outcome.approach,
            word_limit: outcome.word_limit,
            reasoning_steps: outcome.reasoning_steps.clone(),
            final_answer: outcome.final_answer.clone(),
            token_count: outcome.token_count,
            execution_time_ms: outcome.execution_time_ms,
            complexity: outcome.complexity,
        }
    }
}

impl SolveResult {
    /// Human-readable rendering returned by the solver tools.
    pub fn to_text(&self) -> String {
        let steps = if self.reasoning_steps.is_empty() {
            "(no structured steps returned)".to_string()
        } else {
            self.reasoning_steps.join("\n")
        };

        format!(
            "Approach: {} ({})\nWord limit: {} words per step\n\nReasoning:\n{}\n\nFinal answer: {}\n\nStats: {} tokens | {} ms | complexity {}\nOutcome ID: {}",
            self.approach.full_name(),
            self.approach,
            self.word_limit,
            steps,
            self.final_answer,
            self.token_count,
            self.execution_time_ms,
            self.complexity,
            self.outcome_id
        )
    }
}

/// Chain of Draft / Chain of Thought solver
#[derive(Clone)]
pub struct DraftMode {
    backend: Arc<dyn ReasoningBackend>,
    estimator: ComplexityEstimator,
    selector: ApproachSelector,
    performance: Arc<RwLock<PerformanceStore>>,
}

impl DraftMode {
    /// Create a new solver handler
    pub fn new(backend: Arc<dyn ReasoningBackend>, performance: Arc<RwLock<PerformanceStore>>) -> Self {
        Self {
            backend,
            estimator: ComplexityEstimator::new(),
            selector: ApproachSelector::new(),
            performance,
        }
    }

    /// Analyze, select, solve and record.
    pub async fn process(&self, params: SolveParams) -> AppResult<SolveResult> {
        if params.problem.trim().is_empty() {
            return Err(ToolError::validation("problem", "Problem cannot be empty").into());
        }
        let approach = params.approach_override()?;
        let word_limit = params.word_limit_override()?;

        let report = self.estimator.analyze(&params.problem, &params.domain);
        let Selection {
            approach,
            word_limit,
        } = self.selector.select(
            report.estimated_complexity,
            approach,
            word_limit,
            params.adaptive_word_limit,
        );

        debug!(
            domain = %report.domain,
            complexity = report.estimated_complexity,
            approach = %approach,
            word_limit,
            "Solving problem"
        );

        let outcome = self
            .solve(
                &params.problem,
                &report.domain,
                approach,
                word_limit,
                params.enforce_format,
                report.estimated_complexity,
            )
            .await?;

        Ok(SolveResult::from(&outcome))
    }

    /// Ask the collaborator once and record the parsed outcome.
    ///
    /// Nothing is recorded when the call fails.
    pub async fn solve(
        &self,
        problem: &str,
        domain: &str,
        approach: Approach,
        word_limit: u32,
        enforce_format: bool,
        complexity: u32,
    ) -> AppResult<SolutionOutcome> {
        let domain = normalize_domain(domain);
        let prompt = build_solve_prompt(problem, &domain, approach, word_limit, enforce_format);

        let start = Instant::now();
        let content = match self.backend.complete(&prompt).await {
            Ok(content) => content,
            Err(e) => {
                error!(
                    domain = %domain,
                    approach = %approach,
                    error = %e,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Reasoning generation failed"
                );
                return Err(AppError::Generation(e));
            }
        };
        let execution_time_ms = start.elapsed().as_millis() as u64;

        let ParsedResponse {
            reasoning_steps,
            final_answer,
        } = parse_response(&content);

        let outcome = SolutionOutcome {
            id: Uuid::new_v4(),
            problem: problem.to_string(),
            domain,
            approach,
            word_limit,
            reasoning_steps,
            final_answer,
            token_count: estimate_tokens(&content),
            execution_time_ms,
            complexity,
            accuracy: None,
            created_at: Utc::now(),
        };

        self.performance.write().await.record(outcome.clone());

        info!(
            outcome_id = %outcome.id,
            domain = %outcome.domain,
            approach = %approach,
            steps = outcome.reasoning_steps.len(),
            tokens = outcome.token_count,
            latency_ms = execution_time_ms,
            "Problem solved"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::MockReasoningBackend;
    use pretty_assertions::assert_eq;

    const DRAFT_REPLY: &str = "DRAFT 1: 2+2 is 4\nDRAFT 2: two pairs make 4\n\nCOMPARISON: both agree\nFINAL ANSWER: 4";

    fn mode_with(backend: MockReasoningBackend) -> (DraftMode, Arc<RwLock<PerformanceStore>>) {
        let store = Arc::new(RwLock::new(PerformanceStore::new()));
        (DraftMode::new(Arc::new(backend), store.clone()), store)
    }

    #[test]
    fn test_parse_response_collects_steps_in_order() {
        let parsed = parse_response(DRAFT_REPLY);
        assert_eq!(
            parsed,
            ParsedResponse {
                reasoning_steps: vec![
                    "DRAFT 1: 2+2 is 4".to_string(),
                    "DRAFT 2: two pairs make 4".to_string(),
                    "COMPARISON: both agree".to_string(),
                ],
                final_answer: "4".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_response_trims_lines_and_ignores_prose() {
        let parsed = parse_response("Let me think.\n  STEP 1: add\r\nSTEP 2: check  \nFINAL ANSWER:   42  ");
        assert_eq!(parsed.reasoning_steps, vec!["STEP 1: add", "STEP 2: check"]);
        assert_eq!(parsed.final_answer, "42");
    }

    #[test]
    fn test_parse_response_last_final_answer_wins() {
        let parsed = parse_response("FINAL ANSWER: 3\nSTEP 1: recheck\nFINAL ANSWER: 4");
        assert_eq!(parsed.final_answer, "4");
    }

    #[test]
    fn test_parse_response_without_final_answer() {
        let parsed = parse_response("STEP 1: unsure");
        assert_eq!(parsed.final_answer, NO_FINAL_ANSWER);

        let parsed = parse_response("");
        assert!(parsed.reasoning_steps.is_empty());
        assert_eq!(parsed.final_answer, NO_FINAL_ANSWER);
    }

    #[test]
    fn test_estimate_tokens_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens(&"x".repeat(400)), 100);
    }

    #[test]
    fn test_solve_params_defaults() {
        let params: SolveParams =
            serde_json::from_value(serde_json::json!({"problem": "2+2"})).unwrap();
        assert_eq!(params.domain, "general");
        assert!(params.approach.is_none());
        assert!(params.max_words_per_step.is_none());
        assert!(params.enforce_format);
        assert!(params.adaptive_word_limit);
    }

    #[tokio::test]
    async fn test_process_records_outcome() {
        let mut backend = MockReasoningBackend::new();
        backend
            .expect_complete()
            .withf(|prompt: &str| prompt.contains("Chain of Thought") && prompt.contains("(max 70 words per step)"))
            .times(1)
            .returning(|_| Ok("STEP 1: 2+2\nFINAL ANSWER: 4".to_string()));
        let (mode, store) = mode_with(backend);

        let result = mode
            .process(SolveParams::new("What is 2+2").with_domain("Math"))
            .await
            .unwrap();

        assert_eq!(result.domain, "math");
        assert_eq!(result.complexity, 70);
        assert_eq!(result.approach, Approach::ChainOfThought);
        assert_eq!(result.word_limit, 70);
        assert_eq!(result.final_answer, "4");
        assert_eq!(result.token_count, estimate_tokens("STEP 1: 2+2\nFINAL ANSWER: 4"));

        let store = store.read().await;
        assert_eq!(store.outcomes().len(), 1);
        assert_eq!(store.outcomes()[0].id, result.outcome_id);
        assert_eq!(store.stats_by_domain(Some("math"))[0].count, 1);
    }

    #[tokio::test]
    async fn test_process_overrides() {
        let mut backend = MockReasoningBackend::new();
        backend
            .expect_complete()
            .withf(|prompt: &str| prompt.contains("Chain of Draft") && !prompt.contains("words per step"))
            .times(1)
            .returning(|_| Ok(DRAFT_REPLY.to_string()));
        let (mode, _store) = mode_with(backend);

        let mut params = SolveParams::new("What is 2+2")
            .with_approach("cod")
            .with_word_limit(30.0);
        params.enforce_format = false;
        let result = mode.process(params).await.unwrap();

        assert_eq!(result.approach, Approach::ChainOfDraft);
        assert_eq!(result.word_limit, 30);
        assert_eq!(result.reasoning_steps.len(), 3);
    }

    #[tokio::test]
    async fn test_process_failure_records_nothing() {
        let mut backend = MockReasoningBackend::new();
        backend.expect_complete().times(1).returning(|_| {
            Err(LlmError::Api {
                status: 500,
                message: "upstream down".to_string(),
            })
        });
        let (mode, store) = mode_with(backend);

        let err = mode.process(SolveParams::new("What is 2+2")).await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
        assert!(err.to_string().starts_with("Failed to generate reasoning:"));
        assert!(err.to_string().contains("upstream down"));
        assert!(store.read().await.outcomes().is_empty());
    }

    #[tokio::test]
    async fn test_process_validation_skips_backend() {
        let mut backend = MockReasoningBackend::new();
        backend.expect_complete().times(0);
        let (mode, _store) = mode_with(backend);

        let err = mode.process(SolveParams::new("   ")).await.unwrap_err();
        assert!(matches!(err, AppError::Tool(ToolError::Validation { ref field, .. }) if field == "problem"));

        let err = mode
            .process(SolveParams::new("x").with_approach("tree"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Tool(ToolError::Validation { ref field, .. }) if field == "approach"));

        let err = mode
            .process(SolveParams::new("x").with_word_limit(0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Tool(ToolError::Validation { ref field, .. }) if field == "max_words_per_step"));
    }

    #[test]
    fn test_solve_result_text() {
        let result = SolveResult {
            outcome_id: Uuid::nil(),
            domain: "math".to_string(),
            approach: Approach::ChainOfDraft,
            word_limit: 120,
            reasoning_steps: vec!["DRAFT 1: four".to_string()],
            final_answer: "4".to_string(),
            token_count: 12,
            execution_time_ms: 340,
            complexity: 125,
        };

        let text = result.to_text();
        assert!(text.starts_with("Approach: Chain of Draft (CoD)\nWord limit: 120 words per step"));
        assert!(text.contains("Reasoning:\nDRAFT 1: four"));
        assert!(text.contains("Final answer: 4"));
        assert!(text.contains("Stats: 12 tokens | 340 ms | complexity 125"));
        assert!(text.ends_with("Outcome ID: 00000000-0000-0000-0000-000000000000"));
    }
}

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::render_thought_box;
use crate::error::{AppResult, ToolError};
use crate::metrics::{sanitize_content, AnalyticsAggregator, AnalyticsSnapshot, Metrics, MetricsEngine};
use crate::storage::{ThoughtRecord, ThoughtStore};

/// Input parameters for one thought-chain step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtParams {
    /// The reasoning step text
    pub thought: String,
    /// Whether another step will follow
    pub next_thought_needed: bool,
    /// Position in the chain (must be >= 1)
    pub thought_number: i64,
    /// Estimated chain length (must be >= 1)
    pub total_thoughts: i64,
    #[serde(default)]
    pub is_revision: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revises_thought: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_from_thought: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    /// Allows `thought_number` to exceed `total_thoughts`
    #[serde(default)]
    pub needs_more_thoughts: bool,
}

impl ThoughtParams {
    /// Minimal params for a plain step
    pub fn new(thought: impl Into<String>, thought_number: i64, total_thoughts: i64) -> Self {
        Self {
            thought: thought.into(),
            next_thought_needed: thought_number < total_thoughts,
            thought_number,
            total_thoughts,
            is_revision: false,
            revises_thought: None,
            branch_from_thought: None,
            branch_id: None,
            needs_more_thoughts: false,
        }
    }

    /// Mark as a revision of an earlier thought
    pub fn revising(mut self, thought_number: i64) -> Self {
        self.is_revision = true;
        self.revises_thought = Some(thought_number);
        self
    }

    /// Place on a named branch diverging from an earlier thought
    pub fn on_branch(mut self, branch_id: impl Into<String>, from_thought: i64) -> Self {
        self.branch_id = Some(branch_id.into());
        self.branch_from_thought = Some(from_thought);
        self
    }

    /// Allow the chain to grow past `total_thoughts`
    pub fn extending(mut self) -> Self {
        self.needs_more_thoughts = true;
        self
    }

    /// Sanitize, validate and score into a record.
    ///
    /// When `needs_more_thoughts` is set and the step number exceeds the
    /// estimate, the recorded total is raised to the step number.
    pub fn into_record(self, engine: &MetricsEngine) -> Result<ThoughtRecord, ToolError> {
        let content = sanitize_content(&self.thought);
        if content.is_empty() {
            return Err(ToolError::validation(
                "thought",
                "Thought content cannot be empty",
            ));
        }

        let thought_number = positive("thoughtNumber", self.thought_number)?;
        let total_thoughts = positive("totalThoughts", self.total_thoughts)?;
        let revises_thought = self
            .revises_thought
            .map(|n| positive("revisesThought", n))
            .transpose()?;
        let branch_from = self
            .branch_from_thought
            .map(|n| positive("branchFromThought", n))
            .transpose()?;

        if let Some(id) = &self.branch_id {
            if id.trim().is_empty() {
                return Err(ToolError::validation("branchId", "Branch id cannot be empty"));
            }
        }
        match (&self.branch_id, branch_from) {
            (Some(_), None) => {
                return Err(ToolError::validation(
                    "branchFromThought",
                    "Required when branchId is given",
                ))
            }
            (None, Some(_)) => {
                return Err(ToolError::validation(
                    "branchId",
                    "Required when branchFromThought is given",
                ))
            }
            _ => {}
        }

        if thought_number > total_thoughts && !self.needs_more_thoughts {
            return Err(ToolError::validation(
                "thoughtNumber",
                "Thought number cannot exceed total thoughts unless extending",
            ));
        }
        let total_thoughts = total_thoughts.max(thought_number);

        let metrics = engine.score(&content, self.is_revision, self.branch_id.as_deref());

        Ok(ThoughtRecord {
            content,
            thought_number,
            total_thoughts,
            next_needed: self.next_thought_needed,
            is_revision: self.is_revision,
            revises_thought,
            branch_from,
            branch_id: self.branch_id,
            needs_more_thoughts: self.needs_more_thoughts,
            timestamp: chrono::Utc::now(),
            metrics,
            processed: true,
        })
    }
}

fn positive(field: &str, value: i64) -> Result<u32, ToolError> {
    if value < 1 {
        return Err(ToolError::validation(field, "Must be a positive integer"));
    }
    u32::try_from(value).map_err(|_| ToolError::validation(field, "Value is too large"))
}

/// Analytics fields echoed with every thought result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThoughtAnalytics {
    pub total_thoughts: u64,
    pub average_quality: f64,
    pub chain_effectiveness: f64,
}

impl From<&AnalyticsSnapshot> for ThoughtAnalytics {
    fn from(snapshot: &AnalyticsSnapshot) -> Self {
        Self {
            total_thoughts: snapshot.total_thoughts,
            average_quality: snapshot.average_quality,
            chain_effectiveness: snapshot.chain_effectiveness,
        }
    }
}

/// Result of one thought-chain step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThoughtResult {
    pub thought_number: u32,
    /// Possibly raised by `needsMoreThoughts`
    pub total_thoughts: u32,
    pub metrics: Metrics,
    pub analytics: ThoughtAnalytics,
    pub next_thought_needed: bool,
    /// Known branch ids, sorted
    pub branches: Vec<String>,
    pub thought_history_length: usize,
    /// Boxed rendering of the accepted thought
    pub visual_output: String,
}

/// History and analytics, mutated together under one lock.
#[derive(Debug, Default)]
pub struct ThoughtSession {
    pub store: ThoughtStore,
    pub analytics: AnalyticsAggregator,
}

/// Thought-chain mode handler
#[derive(Clone)]
pub struct ThoughtMode {
    engine: MetricsEngine,
    session: Arc<Mutex<ThoughtSession>>,
}

impl Default for ThoughtMode {
    fn default() -> Self {
        Self::new()
    }
}

impl ThoughtMode {
    /// Create a handler with an empty session
    pub fn new() -> Self {
        Self {
            engine: MetricsEngine::new(),
            session: Arc::new(Mutex::new(ThoughtSession::default())),
        }
    }

    /// Validate, score, store and observe one thought.
    ///
    /// Nothing is stored when validation fails.
    pub async fn process(&self, params: ThoughtParams) -> AppResult<ThoughtResult> {
        let record = params.into_record(&self.engine)?;

        let visual_output = render_thought_box(&record);
        debug!("\n{}", visual_output);

        let mut session = self.session.lock().await;
        let snapshot = session.analytics.observe(&record);
        let mut result = ThoughtResult {
            thought_number: record.thought_number,
            total_thoughts: record.total_thoughts,
            metrics: record.metrics,
            analytics: ThoughtAnalytics::from(&snapshot),
            next_thought_needed: record.next_needed,
            branches: Vec::new(),
            thought_history_length: 0,
            visual_output,
        };

        session.store.append(record);
        result.branches = session
            .store
            .branch_ids()
            .into_iter()
            .map(String::from)
            .collect();
        result.thought_history_length = session.store.len();
        drop(session);

        info!(
            thought_number = result.thought_number,
            total_thoughts = result.total_thoughts,
            quality = result.metrics.quality,
            history = result.thought_history_length,
            "Thought processed"
        );

        Ok(result)
    }

    /// Current analytics snapshot
    pub async fn analytics(&self) -> AnalyticsSnapshot {
        self.session.lock().await.analytics.snapshot()
    }

    /// Copy of the full thought history
    pub async fn history(&self) -> Vec<ThoughtRecord> {
        self.session.lock().await.store.history().to_vec()
    }

    /// Copy of one branch's thoughts
    pub async fn branch(&self, branch_id: &str) -> Vec<ThoughtRecord> {
        self.session
            .lock()
            .await
            .store
            .branch(branch_id)
            .into_iter()
            .cloned()
            .collect()
    }
}

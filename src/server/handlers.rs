use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use super::SharedState;
use crate::complexity::{normalize_domain, DEFAULT_DOMAIN};
use crate::error::{McpError, McpResult, ToolError};
use crate::modes::{SolveParams, ThoughtParams};

/// Route tool calls to appropriate handlers
pub async fn handle_tool_call(
    state: &SharedState,
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<Value> {
    info!(tool = %tool_name, "Routing tool call");

    match tool_name {
        "rat" => handle_rat(state, arguments).await,
        // Solver tools
        "chain_of_draft_solve" => handle_solve(state, tool_name, None, arguments).await,
        "math_solve" => handle_solve(state, tool_name, Some("math"), arguments).await,
        "code_solve" => handle_solve(state, tool_name, Some("code"), arguments).await,
        "logic_solve" => handle_solve(state, tool_name, Some("logic"), arguments).await,
        // Read-only analysis tools
        "get_performance_stats" => handle_performance_stats(state, arguments).await,
        "get_token_reduction" => handle_token_reduction(state).await,
        "analyze_problem_complexity" => handle_analyze_complexity(state, arguments).await,
        "record_solution_accuracy" => handle_record_accuracy(state, arguments).await,
        _ => Err(McpError::UnknownTool {
            tool_name: tool_name.to_string(),
        }),
    }
}

/// Handle rat tool call
async fn handle_rat(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    execute_handler("rat", arguments, |params: ThoughtParams| {
        state.thought_mode.process(params)
    })
    .await
}

/// Handle the solver tools; preset tools pin the domain.
///
/// Returns the human-readable rendering as a JSON string.
async fn handle_solve(
    state: &SharedState,
    tool_name: &str,
    domain: Option<&str>,
    arguments: Option<Value>,
) -> McpResult<Value> {
    let mut params: SolveParams = parse_arguments(tool_name, arguments)?;
    if let Some(domain) = domain {
        params.domain = domain.to_string();
    }

    let result = state
        .draft_mode
        .process(params)
        .await
        .map_err(execution_failed)?;

    Ok(Value::String(result.to_text()))
}

/// Handle get_performance_stats - averages per domain and approach
async fn handle_performance_stats(
    state: &SharedState,
    arguments: Option<Value>,
) -> McpResult<Value> {
    #[derive(Deserialize)]
    struct StatsParams {
        #[serde(default)]
        domain: Option<String>,
    }

    let params: StatsParams =
        parse_arguments("get_performance_stats", Some(arguments.unwrap_or_else(|| json!({}))))?;
    let domain = params.domain.as_deref().map(normalize_domain);

    let stats = state
        .performance
        .read()
        .await
        .stats_by_domain(domain.as_deref());

    serde_json::to_value(stats).map_err(McpError::Json)
}

/// Handle get_token_reduction - draft vs step token comparison per domain
async fn handle_token_reduction(state: &SharedState) -> McpResult<Value> {
    let reductions = state.performance.read().await.token_reduction();
    serde_json::to_value(reductions).map_err(McpError::Json)
}

/// Handle analyze_problem_complexity - no collaborator call
async fn handle_analyze_complexity(
    state: &SharedState,
    arguments: Option<Value>,
) -> McpResult<Value> {
    #[derive(Deserialize)]
    struct ComplexityParams {
        problem: String,
        #[serde(default = "default_domain")]
        domain: String,
    }

    fn default_domain() -> String {
        DEFAULT_DOMAIN.to_string()
    }

    let params: ComplexityParams = parse_arguments("analyze_problem_complexity", arguments)?;
    if params.problem.trim().is_empty() {
        return Err(execution_failed(ToolError::validation(
            "problem",
            "Problem cannot be empty",
        )));
    }

    let overview = state
        .selector
        .overview(&state.estimator, &params.problem, &params.domain);

    serde_json::to_value(overview).map_err(McpError::Json)
}

/// Handle record_solution_accuracy - attach a score to a recorded outcome
async fn handle_record_accuracy(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    #[derive(Deserialize)]
    struct AccuracyParams {
        outcome_id: String,
        accuracy: f64,
    }

    #[derive(Serialize)]
    struct AccuracyRecorded {
        outcome_id: Uuid,
        accuracy: f64,
        status: &'static str,
    }

    let params: AccuracyParams = parse_arguments("record_solution_accuracy", arguments)?;
    let outcome_id = Uuid::parse_str(params.outcome_id.trim())
        .map_err(|_| execution_failed(ToolError::validation("outcome_id", "Must be a UUID")))?;

    state
        .performance
        .write()
        .await
        .record_accuracy(outcome_id, params.accuracy)
        .map_err(execution_failed)?;

    serde_json::to_value(AccuracyRecorded {
        outcome_id,
        accuracy: params.accuracy,
        status: "recorded",
    })
    .map_err(McpError::Json)
}

fn execution_failed(err: impl std::fmt::Display) -> McpError {
    McpError::ExecutionFailed {
        message: err.to_string(),
    }
}

/// Parse tool arguments into a typed struct
fn parse_arguments<T: serde::de::DeserializeOwned>(
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<T> {
    match arguments {
        Some(args) => serde_json::from_value(args).map_err(|e| McpError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: e.to_string(),
        }),
        None => Err(McpError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: "Missing arguments".to_string(),
        }),
    }
}

/// Generic handler that executes a mode operation with consistent error handling.
///
/// # Type Parameters
/// - `P`: Parameter type (must implement DeserializeOwned)
/// - `R`: Result type (must implement Serialize)
/// - `E`: Error type (must implement Display)
/// - `F`: Async operation that takes P and returns Result<R, E>
async fn execute_handler<P, R, E, F, Fut>(
    tool_name: &str,
    arguments: Option<Value>,
    operation: F,
) -> McpResult<Value>
where
    P: serde::de::DeserializeOwned,
    R: Serialize,
    E: std::fmt::Display,
    F: FnOnce(P) -> Fut,
    Fut: std::future::Future<Output = Result<R, E>>,
{
    let params: P = parse_arguments(tool_name, arguments)?;

    let result = operation(params).await.map_err(execution_failed)?;

    serde_json::to_value(result).map_err(McpError::Json)
}

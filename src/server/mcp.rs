//! MCP protocol implementation for JSON-RPC 2.0 communication.
//!
//! This module provides the core MCP server implementation including:
//! - JSON-RPC 2.0 request/response handling
//! - Tool definitions and schemas
//! - Stdio-based server communication

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use super::{handle_tool_call, SharedState};
use crate::error::McpError;

#[cfg(test)]
#[path = "mcp_tests.rs"]
mod mcp_tests;

/// MCP protocol revision implemented by this server.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported during initialization.
pub const SERVER_NAME: &str = "mcp-rat-reasoning";

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request identifier (None for notifications).
    pub id: Option<Value>,
    /// The method name to invoke.
    pub method: String,
    /// Optional parameters for the method.
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: String,
    /// Request identifier (null when the request id could not be read).
    pub id: Value,
    /// The result on success (mutually exclusive with error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The error on failure (mutually exclusive with result).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// Error code (negative for predefined errors).
    pub code: i32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional error data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// MCP server information returned during initialization.
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    /// The server name identifier.
    pub name: String,
    /// The server version string.
    pub version: String,
}

/// MCP server capabilities advertised to clients.
#[derive(Debug, Serialize)]
pub struct Capabilities {
    /// Tool-related capabilities.
    pub tools: ToolCapabilities,
}

/// Tool-specific capabilities.
#[derive(Debug, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change dynamically.
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Result of the MCP initialize handshake.
#[derive(Debug, Serialize)]
pub struct InitializeResult {
    /// The MCP protocol version supported.
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Server capabilities.
    pub capabilities: Capabilities,
    /// Server identification information.
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

/// MCP tool definition with JSON Schema.
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    /// Unique tool name (used in tool calls).
    pub name: String,
    /// Human-readable description of the tool.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Parameters for a tools/call request.
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    /// The name of the tool to invoke.
    pub name: String,
    /// Optional arguments for the tool.
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Content item within a tool result.
#[derive(Debug, Serialize)]
pub struct ToolResultContent {
    /// The content type (e.g., "text").
    #[serde(rename = "type")]
    pub content_type: String,
    /// The text content of the result.
    pub text: String,
}

/// Result of a tool invocation.
#[derive(Debug, Serialize)]
pub struct ToolCallResult {
    /// The result content items.
    pub content: Vec<ToolResultContent>,
    /// Whether the result represents an error.
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolCallResult {
    /// Successful result. Strings are sent verbatim, anything else as pretty JSON.
    pub fn from_value(value: Value) -> Self {
        let text = match value {
            Value::String(text) => text,
            other => serde_json::to_string_pretty(&other).unwrap_or_else(|e| {
                error!(error = %e, "Failed to serialize tool result");
                format!("{{\"error\": \"Serialization failed: {}\"}}", e)
            }),
        };

        Self {
            content: vec![ToolResultContent {
                content_type: "text".to_string(),
                text,
            }],
            is_error: None,
        }
    }

    /// Error-flagged result carrying `{"error": ..., "status": "failed"}`.
    pub fn from_error(err: &McpError) -> Self {
        let message = match err {
            McpError::ExecutionFailed { message } => message.clone(),
            other => other.to_string(),
        };
        let payload = serde_json::json!({
            "error": message,
            "status": "failed",
        });

        Self {
            content: vec![ToolResultContent {
                content_type: "text".to_string(),
                text: serde_json::to_string_pretty(&payload).unwrap_or(message),
            }],
            is_error: Some(true),
        }
    }
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// MCP Server running over stdio.
///
/// Handles JSON-RPC 2.0 messages over stdin/stdout for MCP protocol
/// communication with clients.
pub struct McpServer {
    /// Shared application state.
    state: SharedState,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Run the server using async stdio
    pub async fn run(&self) -> std::io::Result<()> {
        info!("MCP RAT Reasoning Server starting...");

        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            // EOF reached
            if bytes_read == 0 {
                info!("EOF received, shutting down");
                break;
            }

            if let Some(response) = self.handle_line(&line).await {
                let response_json = serde_json::to_string(&response)?;
                debug!(response = %response_json, "Sending response");

                stdout.write_all(response_json.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle one line of input.
    ///
    /// Returns None for blank lines and notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        debug!(request = %trimmed, "Received request");

        match serde_json::from_str::<JsonRpcRequest>(trimmed) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                error!(error = %e, "Failed to parse request");
                Some(JsonRpcResponse::error(
                    None,
                    -32700,
                    format!("Parse error: {}", e),
                ))
            }
        }
    }

    /// Handle a single JSON-RPC request
    /// Returns None for notifications (requests without id)
    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let is_notification = request.id.is_none();

        if request.jsonrpc != "2.0" {
            warn!(version = %request.jsonrpc, "Unexpected JSON-RPC version");
        }

        match request.method.as_str() {
            "initialize" => Some(self.handle_initialize(request.id)),
            "initialized" | "notifications/initialized" | "notifications/cancelled" => {
                debug!(method = %request.method, "Received notification");
                None
            }
            "tools/list" => Some(self.handle_tools_list(request.id)),
            "tools/call" => Some(self.handle_tool_call(request.id, request.params).await),
            "ping" => Some(JsonRpcResponse::success(
                request.id,
                Value::Object(Default::default()),
            )),
            method => {
                if is_notification {
                    debug!(method = %method, "Unknown notification, ignoring");
                    None
                } else {
                    error!(method = %method, "Unknown method");
                    Some(JsonRpcResponse::error(
                        request.id,
                        -32601,
                        format!("Method not found: {}", method),
                    ))
                }
            }
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("Handling initialize request");

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: Capabilities {
                tools: ToolCapabilities {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        match serde_json::to_value(result) {
            Ok(val) => JsonRpcResponse::success(id, val),
            Err(e) => {
                error!(error = %e, "Failed to serialize initialize result");
                JsonRpcResponse::error(id, -32603, format!("Internal error: {}", e))
            }
        }
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("Handling tools/list request");

        JsonRpcResponse::success(
            id,
            serde_json::json!({
                "tools": list_tools()
            }),
        )
    }

    /// Handle tools/call request
    async fn handle_tool_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, format!("Invalid params: {}", e));
                }
            },
            None => {
                return JsonRpcResponse::error(id, -32602, "Missing params");
            }
        };

        info!(tool = %params.name, "Handling tool call");

        let tool_result = match handle_tool_call(&self.state, &params.name, params.arguments).await
        {
            Ok(value) => ToolCallResult::from_value(value),
            Err(e) => {
                warn!(tool = %params.name, error = %e, "Tool call failed");
                ToolCallResult::from_error(&e)
            }
        };

        match serde_json::to_value(tool_result) {
            Ok(val) => JsonRpcResponse::success(id, val),
            Err(e) => {
                error!(error = %e, "Failed to serialize tool call result");
                JsonRpcResponse::error(id, -32603, format!("Internal error: {}", e))
            }
        }
    }
}

/// Every tool this server registers, in listing order.
pub fn list_tools() -> Vec<Tool> {
    vec![
        get_rat_tool(),
        get_chain_of_draft_solve_tool(),
        get_domain_solve_tool("math_solve", "math"),
        get_domain_solve_tool("code_solve", "code"),
        get_domain_solve_tool("logic_solve", "logic"),
        get_performance_stats_tool(),
        get_token_reduction_tool(),
        get_analyze_complexity_tool(),
        get_record_accuracy_tool(),
    ]
}

/// Get the thought-chain tool definition
fn get_rat_tool() -> Tool {
    Tool {
        name: "rat".to_string(),
        description: "A context-aware reasoning system that orchestrates structured thought processes. \
            Each call submits one step of a thought chain; steps may revise earlier thoughts or \
            branch from them. Every step is scored for complexity, depth, quality, impact and \
            confidence, and session analytics are returned alongside."
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "thought": {
                    "type": "string",
                    "description": "Your current thinking step"
                },
                "nextThoughtNeeded": {
                    "type": "boolean",
                    "description": "Whether another thought step is needed"
                },
                "thoughtNumber": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Current thought number"
                },
                "totalThoughts": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Estimated total thoughts needed"
                },
                "isRevision": {
                    "type": "boolean",
                    "description": "Whether this revises previous thinking"
                },
                "revisesThought": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Which thought is being reconsidered"
                },
                "branchFromThought": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Branching point thought number"
                },
                "branchId": {
                    "type": "string",
                    "description": "Branch identifier"
                },
                "needsMoreThoughts": {
                    "type": "boolean",
                    "description": "If more thoughts are needed beyond totalThoughts"
                }
            },
            "required": ["thought", "nextThoughtNeeded", "thoughtNumber", "totalThoughts"]
        }),
    }
}

fn solve_properties(with_domain: bool) -> Value {
    let mut properties = serde_json::json!({
        "problem": {
            "type": "string",
            "description": "The problem to solve"
        },
        "approach": {
            "type": "string",
            "enum": ["CoD", "CoT"],
            "description": "Force Chain of Draft (CoD) or Chain of Thought (CoT)"
        },
        "max_words_per_step": {
            "type": "number",
            "minimum": 1,
            "description": "Maximum words per reasoning step"
        },
        "enforce_format": {
            "type": "boolean",
            "description": "State the word limit in the prompt (default: true)"
        },
        "adaptive_word_limit": {
            "type": "boolean",
            "description": "Derive the word limit from problem complexity (default: true)"
        }
    });

    if with_domain {
        properties["domain"] = serde_json::json!({
            "type": "string",
            "description": "Problem domain: math, logic, code or general (default: general)"
        });
    }

    properties
}

/// Get the general solver tool definition
fn get_chain_of_draft_solve_tool() -> Tool {
    Tool {
        name: "chain_of_draft_solve".to_string(),
        description: "Solve a problem with Chain of Draft or Chain of Thought reasoning. \
            The approach and per-step word limit are picked from the problem's complexity \
            unless overridden."
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": solve_properties(true),
            "required": ["problem"]
        }),
    }
}

/// Get a solver tool definition with the domain fixed
fn get_domain_solve_tool(name: &str, domain: &str) -> Tool {
    Tool {
        name: name.to_string(),
        description: format!(
            "Solve a {} problem with Chain of Draft or Chain of Thought reasoning.",
            domain
        ),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": solve_properties(false),
            "required": ["problem"]
        }),
    }
}

/// Get the performance stats tool definition
fn get_performance_stats_tool() -> Tool {
    Tool {
        name: "get_performance_stats".to_string(),
        description: "Average tokens, latency and accuracy of solved problems per domain and approach."
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "domain": {
                    "type": "string",
                    "description": "Only report this domain"
                }
            }
        }),
    }
}

/// Get the token reduction tool definition
fn get_token_reduction_tool() -> Tool {
    Tool {
        name: "get_token_reduction".to_string(),
        description: "Token reduction of Chain of Draft over Chain of Thought per domain. \
            Only domains with samples of both approaches are reported."
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    }
}

/// Get the complexity analysis tool definition
fn get_analyze_complexity_tool() -> Tool {
    Tool {
        name: "analyze_problem_complexity".to_string(),
        description: "Estimate a problem's complexity and the approach and word limit a solve would use, without solving it."
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "problem": {
                    "type": "string",
                    "description": "The problem to analyze"
                },
                "domain": {
                    "type": "string",
                    "description": "Problem domain: math, logic, code or general (default: general)"
                }
            },
            "required": ["problem"]
        }),
    }
}

/// Get the accuracy recording tool definition
fn get_record_accuracy_tool() -> Tool {
    Tool {
        name: "record_solution_accuracy".to_string(),
        description: "Attach an accuracy score between 0 and 1 to a previously solved problem."
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "outcome_id": {
                    "type": "string",
                    "description": "Outcome ID reported by a solver tool"
                },
                "accuracy": {
                    "type": "number",
                    "minimum": 0,
                    "maximum": 1,
                    "description": "Accuracy score (0.0-1.0)"
                }
            },
            "required": ["outcome_id", "accuracy"]
        }),
    }
}

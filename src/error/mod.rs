use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{0}")]
    Tool(#[from] ToolError),

    #[error("Failed to generate reasoning: {0}")]
    Generation(#[source] LlmError),

    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised by the external reasoning collaborator
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// MCP protocol errors
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Unknown tool: {tool_name}")]
    UnknownTool { tool_name: String },

    #[error("Invalid parameters for {tool_name}: {message}")]
    InvalidParameters { tool_name: String, message: String },

    #[error("Tool execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tool-specific errors with structured details
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Validation failed: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Unknown outcome: {outcome_id}")]
    UnknownOutcome { outcome_id: String },
}

impl ToolError {
    /// Shorthand for a validation failure on one input field.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ToolError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<AppError> for McpError {
    fn from(err: AppError) -> Self {
        McpError::ExecutionFailed {
            message: err.to_string(),
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for reasoning collaborator calls
pub type LlmResult<T> = Result<T, LlmError>;

/// Result type alias for MCP operations
pub type McpResult<T> = Result<T, McpError>;

//! Unit tests for MCP protocol implementation.
//!
//! Tests JSON-RPC 2.0 request/response handling, tool definitions,
//! and MCP type serialization.

use super::*;
use crate::config::Config;
use crate::llm::MockReasoningBackend;
use crate::server::AppState;
use serde_json::json;
use std::sync::Arc;

fn test_server() -> McpServer {
    let state = AppState::new(Config::default(), Arc::new(MockReasoningBackend::new()));
    McpServer::new(Arc::new(state))
}

fn tool_text(response: &JsonRpcResponse) -> String {
    response.result.as_ref().unwrap()["content"][0]["text"]
        .as_str()
        .unwrap()
        .to_string()
}

// ============================================================================
// JsonRpcResponse tests
// ============================================================================

#[test]
fn test_jsonrpc_response_success_with_id() {
    let response = JsonRpcResponse::success(Some(json!(1)), json!({"result": "ok"}));

    assert_eq!(response.jsonrpc, "2.0");
    assert_eq!(response.id, json!(1));
    assert!(response.error.is_none());
    assert_eq!(response.result.unwrap()["result"], "ok");
}

#[test]
fn test_jsonrpc_response_success_without_id() {
    let response = JsonRpcResponse::success(None, json!({"data": "value"}));

    assert_eq!(response.id, Value::Null);
    assert!(response.result.is_some());
}

#[test]
fn test_jsonrpc_response_error_with_id() {
    let response = JsonRpcResponse::error(Some(json!(42)), -32600, "Invalid request");

    assert_eq!(response.id, json!(42));
    assert!(response.result.is_none());

    let error = response.error.unwrap();
    assert_eq!(error.code, -32600);
    assert_eq!(error.message, "Invalid request");
}

#[test]
fn test_jsonrpc_response_serialization() {
    let response = JsonRpcResponse::success(Some(json!(1)), json!({"test": true}));
    let serialized = serde_json::to_string(&response).unwrap();

    assert!(serialized.contains("\"jsonrpc\":\"2.0\""));
    assert!(serialized.contains("\"id\":1"));
    // Error should be omitted when None
    assert!(!serialized.contains("\"error\""));
}

#[test]
fn test_jsonrpc_error_serialization() {
    let response = JsonRpcResponse::error(Some(json!(1)), -32601, "Method not found");
    let serialized = serde_json::to_string(&response).unwrap();

    assert!(serialized.contains("-32601"));
    // Result should be omitted when None
    assert!(!serialized.contains("\"result\""));
}

// ============================================================================
// Request deserialization tests
// ============================================================================

#[test]
fn test_jsonrpc_request_deserialization() {
    let json_str = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#;
    let request: JsonRpcRequest = serde_json::from_str(json_str).unwrap();

    assert_eq!(request.id, Some(json!(1)));
    assert_eq!(request.method, "initialize");
    assert!(request.params.is_some());
}

#[test]
fn test_jsonrpc_notification_no_id() {
    let json_str = r#"{"jsonrpc":"2.0","method":"initialized","params":{}}"#;
    let request: JsonRpcRequest = serde_json::from_str(json_str).unwrap();

    assert!(request.id.is_none());
}

#[test]
fn test_tool_call_params_without_arguments() {
    let json_str = r#"{"name":"get_token_reduction"}"#;
    let params: ToolCallParams = serde_json::from_str(json_str).unwrap();

    assert_eq!(params.name, "get_token_reduction");
    assert!(params.arguments.is_none());
}

// ============================================================================
// Tool result tests
// ============================================================================

#[test]
fn test_tool_result_string_sent_verbatim() {
    let result = ToolCallResult::from_value(json!("Final answer: 4"));

    assert_eq!(result.content[0].text, "Final answer: 4");
    assert!(result.is_error.is_none());
}

#[test]
fn test_tool_result_object_pretty_printed() {
    let result = ToolCallResult::from_value(json!({"a": 1}));

    assert_eq!(result.content[0].text, "{\n  \"a\": 1\n}");
}

#[test]
fn test_tool_result_error_payload() {
    let err = McpError::ExecutionFailed {
        message: "Validation failed: thought - Thought content cannot be empty".to_string(),
    };
    let result = ToolCallResult::from_error(&err);

    assert_eq!(result.is_error, Some(true));
    let payload: Value = serde_json::from_str(&result.content[0].text).unwrap();
    assert_eq!(payload["status"], "failed");
    assert_eq!(
        payload["error"],
        "Validation failed: thought - Thought content cannot be empty"
    );
}

#[test]
fn test_tool_result_unknown_tool_payload() {
    let err = McpError::UnknownTool {
        tool_name: "nope".to_string(),
    };
    let payload: Value =
        serde_json::from_str(&ToolCallResult::from_error(&err).content[0].text).unwrap();

    assert_eq!(payload["error"], "Unknown tool: nope");
}

// ============================================================================
// Tool definition tests
// ============================================================================

#[test]
fn test_list_tools_names() {
    let names: Vec<String> = list_tools().into_iter().map(|t| t.name).collect();

    assert_eq!(
        names,
        vec![
            "rat",
            "chain_of_draft_solve",
            "math_solve",
            "code_solve",
            "logic_solve",
            "get_performance_stats",
            "get_token_reduction",
            "analyze_problem_complexity",
            "record_solution_accuracy",
        ]
    );
}

#[test]
fn test_rat_tool_definition() {
    let tool = get_rat_tool();

    let schema = &tool.input_schema;
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["thoughtNumber"]["minimum"], 1);
    let required = schema["required"].as_array().unwrap();
    assert!(required.contains(&json!("thought")));
    assert!(required.contains(&json!("nextThoughtNeeded")));
    assert!(!required.contains(&json!("branchId")));
}

#[test]
fn test_solve_tool_definitions() {
    let general = get_chain_of_draft_solve_tool();
    assert!(general.input_schema["properties"]["domain"].is_object());
    assert_eq!(
        general.input_schema["properties"]["approach"]["enum"],
        json!(["CoD", "CoT"])
    );

    let math = get_domain_solve_tool("math_solve", "math");
    assert_eq!(math.name, "math_solve");
    assert!(math.description.contains("math"));
    assert!(math.input_schema["properties"]["domain"].is_null());
    assert_eq!(math.input_schema["required"], json!(["problem"]));
}

#[test]
fn test_record_accuracy_tool_definition() {
    let tool = get_record_accuracy_tool();

    let required = tool.input_schema["required"].as_array().unwrap();
    assert!(required.contains(&json!("outcome_id")));
    assert!(required.contains(&json!("accuracy")));
    assert_eq!(tool.input_schema["properties"]["accuracy"]["maximum"], 1);
}

// ============================================================================
// Protocol dispatch tests
// ============================================================================

#[tokio::test]
async fn test_handle_line_blank_ignored() {
    assert!(test_server().handle_line("   \n").await.is_none());
}

#[tokio::test]
async fn test_handle_line_parse_error() {
    let response = test_server().handle_line("{not json").await.unwrap();

    assert_eq!(response.id, Value::Null);
    assert_eq!(response.error.unwrap().code, -32700);
}

#[tokio::test]
async fn test_initialize() {
    let response = test_server()
        .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
        .await
        .unwrap();

    let result = response.result.unwrap();
    assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
    assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
    assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
}

#[tokio::test]
async fn test_notifications_get_no_response() {
    let server = test_server();

    assert!(server
        .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await
        .is_none());
    assert!(server
        .handle_line(r#"{"jsonrpc":"2.0","method":"something/else"}"#)
        .await
        .is_none());
}

#[tokio::test]
async fn test_unknown_method() {
    let response = test_server()
        .handle_line(r#"{"jsonrpc":"2.0","id":7,"method":"resources/list"}"#)
        .await
        .unwrap();

    let error = response.error.unwrap();
    assert_eq!(error.code, -32601);
    assert!(error.message.contains("resources/list"));
}

#[tokio::test]
async fn test_ping() {
    let response = test_server()
        .handle_line(r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#)
        .await
        .unwrap();

    assert_eq!(response.id, json!("p"));
    assert_eq!(response.result.unwrap(), json!({}));
}

#[tokio::test]
async fn test_tools_list() {
    let response = test_server()
        .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
        .await
        .unwrap();

    let tools = response.result.unwrap()["tools"].as_array().unwrap().len();
    assert_eq!(tools, 9);
}

#[tokio::test]
async fn test_tools_call_missing_params() {
    let response = test_server()
        .handle_line(r#"{"jsonrpc":"2.0","id":3,"method":"tools/call"}"#)
        .await
        .unwrap();

    assert_eq!(response.error.unwrap().code, -32602);
}

#[tokio::test]
async fn test_tools_call_unknown_tool_is_flagged_result() {
    let response = test_server()
        .handle_line(r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"nope"}}"#)
        .await
        .unwrap();

    assert!(response.error.is_none());
    assert_eq!(response.result.as_ref().unwrap()["isError"], true);
    assert!(tool_text(&response).contains("Unknown tool: nope"));
}

#[tokio::test]
async fn test_tools_call_rat_validation_failure() {
    let line = json!({
        "jsonrpc": "2.0",
        "id": 5,
        "method": "tools/call",
        "params": {
            "name": "rat",
            "arguments": {
                "thought": "Too far ahead",
                "nextThoughtNeeded": true,
                "thoughtNumber": 4,
                "totalThoughts": 2
            }
        }
    })
    .to_string();

    let response = test_server().handle_line(&line).await.unwrap();

    assert_eq!(response.result.as_ref().unwrap()["isError"], true);
    let payload: Value = serde_json::from_str(&tool_text(&response)).unwrap();
    assert_eq!(payload["status"], "failed");
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("cannot exceed total thoughts"));
}

#[tokio::test]
async fn test_tools_call_rat_success() {
    let line = json!({
        "jsonrpc": "2.0",
        "id": 6,
        "method": "tools/call",
        "params": {
            "name": "rat",
            "arguments": {
                "thought": "Therefore the key constraint is memory.",
                "nextThoughtNeeded": false,
                "thoughtNumber": 1,
                "totalThoughts": 1
            }
        }
    })
    .to_string();

    let response = test_server().handle_line(&line).await.unwrap();

    assert!(response.result.as_ref().unwrap().get("isError").is_none());
    let body: Value = serde_json::from_str(&tool_text(&response)).unwrap();
    assert_eq!(body["thought_number"], 1);
    assert_eq!(body["thought_history_length"], 1);
}

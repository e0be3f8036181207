//! Config environment variable tests
//!
//! These tests verify that Config::from_env() correctly reads and applies
//! environment variable overrides. Config::from_env() also loads a .env file
//! via dotenvy when one exists, so each test sets the variables it asserts on.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use mcp_rat_reasoning::config::{Config, LogFormat};
use serial_test::serial;
use std::env;

const VARS: &[&str] = &[
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "LLM_MODEL",
    "LLM_MAX_TOKENS",
    "LLM_TEMPERATURE",
    "LOG_LEVEL",
    "LOG_FORMAT",
    "REQUEST_TIMEOUT_MS",
];

fn clear_vars() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_config_from_env_defaults() {
    clear_vars();

    let config = Config::from_env().unwrap();
    assert!(config.llm.api_key.is_none());
    assert_eq!(config.llm.base_url, "https://api.openai.com");
    assert_eq!(config.llm.model, "gpt-4");
    assert_eq!(config.llm.max_tokens, 2000);
    assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.request.timeout_ms, 30000);
}

#[test]
#[serial]
fn test_config_from_env_custom_llm() {
    clear_vars();
    env::set_var("OPENAI_API_KEY", "sk-test");
    env::set_var("OPENAI_BASE_URL", "http://localhost:11434");
    env::set_var("LLM_MODEL", "llama3");
    env::set_var("LLM_MAX_TOKENS", "512");
    env::set_var("LLM_TEMPERATURE", "0.2");

    let config = Config::from_env().unwrap();
    assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.llm.base_url, "http://localhost:11434");
    assert_eq!(config.llm.model, "llama3");
    assert_eq!(config.llm.max_tokens, 512);
    assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);

    clear_vars();
}

#[test]
#[serial]
fn test_config_from_env_blank_api_key_is_unset() {
    clear_vars();
    env::set_var("OPENAI_API_KEY", "   ");

    let config = Config::from_env().unwrap();
    assert!(config.llm.api_key.is_none());

    clear_vars();
}

#[test]
#[serial]
fn test_config_from_env_invalid_temperature() {
    clear_vars();
    env::set_var("LLM_TEMPERATURE", "warm");

    let result = Config::from_env();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("LLM_TEMPERATURE must be a number"));

    clear_vars();
}

#[test]
#[serial]
fn test_config_from_env_temperature_out_of_range() {
    clear_vars();
    env::set_var("LLM_TEMPERATURE", "3.5");

    assert!(Config::from_env().is_err());

    clear_vars();
}

#[test]
#[serial]
fn test_config_from_env_json_log_format() {
    clear_vars();
    env::set_var("LOG_FORMAT", "JSON");
    env::set_var("LOG_LEVEL", "debug");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.logging.level, "debug");

    clear_vars();
}

#[test]
#[serial]
fn test_config_from_env_custom_request_timeout() {
    clear_vars();
    env::set_var("REQUEST_TIMEOUT_MS", "60000");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, 60000);

    clear_vars();
}

#[test]
#[serial]
fn test_config_from_env_unparseable_numbers_fall_back() {
    clear_vars();
    env::set_var("REQUEST_TIMEOUT_MS", "soon");
    env::set_var("LLM_MAX_TOKENS", "many");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, 30000);
    assert_eq!(config.llm.max_tokens, 2000);

    clear_vars();
}

use std::env;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
}

/// Reasoning collaborator (chat-completions endpoint) configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Bearer token. No Authorization header is sent when unset.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let llm = LlmConfig {
            api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
            max_tokens: env::var("LLM_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2000),
            temperature: parse_temperature(env::var("LLM_TEMPERATURE").ok())?,
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30000),
        };

        Ok(Config {
            llm,
            logging,
            request,
        })
    }
}

fn parse_temperature(raw: Option<String>) -> Result<f32, AppError> {
    let Some(raw) = raw else {
        return Ok(0.7);
    };

    let value: f32 = raw.trim().parse().map_err(|_| AppError::Config {
        message: format!("LLM_TEMPERATURE must be a number, got '{}'", raw),
    })?;

    if !(0.0..=2.0).contains(&value) {
        return Err(AppError::Config {
            message: format!("LLM_TEMPERATURE must be within [0, 2], got {}", value),
        });
    }

    Ok(value)
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4".to_string(),
            max_tokens: 2000,
            temperature: 0.7,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout_ms: 30000 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            logging: LoggingConfig::default(),
            request: RequestConfig::default(),
        }
    }
}

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::types::{ChatRequest, ChatResponse, Message};
use super::ReasoningBackend;
use crate::config::{LlmConfig, RequestConfig};
use crate::error::{LlmError, LlmResult};

/// Client for an OpenAI-compatible chat-completions API
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    request_config: RequestConfig,
}

impl LlmClient {
    /// Create a new client
    pub fn new(config: &LlmConfig, request_config: RequestConfig) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(LlmError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            request_config,
        })
    }

    /// Send one chat request. There is no retry: callers see the first failure.
    pub async fn chat(&self, request: ChatRequest) -> LlmResult<ChatResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let start = Instant::now();

        match self.execute_request(&url, &request).await {
            Ok(response) => {
                info!(
                    model = %request.model,
                    latency_ms = start.elapsed().as_millis(),
                    "Chat completion succeeded"
                );
                Ok(response)
            }
            Err(e) => {
                error!(
                    model = %request.model,
                    error = %e,
                    latency_ms = start.elapsed().as_millis(),
                    "Chat completion failed"
                );
                Err(e)
            }
        }
    }

    /// Execute a single request (internal)
    async fn execute_request(&self, url: &str, request: &ChatRequest) -> LlmResult<ChatResponse> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Calling chat completions"
        );

        let mut builder = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(request);

        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout {
                    timeout_ms: self.request_config.timeout_ms,
                }
            } else {
                LlmError::Http(e)
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse {
                message: format!("Failed to parse response: {}", e),
            })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the configured model name
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ReasoningBackend for LlmClient {
    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        let request = ChatRequest::new(&self.model, vec![Message::user(prompt)])
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        let response = self.chat(request).await?;

        response
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| LlmError::InvalidResponse {
                message: "Completion contained no message content".to_string(),
            })
    }
}

//! External reasoning collaborator.
//!
//! The solver path needs exactly one thing from a language model: turn a
//! prompt into completion text. [`ReasoningBackend`] is that seam; the
//! production implementation is [`LlmClient`], an OpenAI-compatible
//! chat-completions client.

mod client;
mod types;


pub use client::LlmClient;
pub use types::*;

use async_trait::async_trait;

use crate::error::LlmResult;

/// Produces reasoning text for a prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Send `prompt` as a single request and return the completion text.
    async fn complete(&self, prompt: &str) -> LlmResult<String>;
}

//! Chat completion client for Scribe.
//!
//! Both utilities send exactly one prompt per run and use the text of the
//! first returned choice. [`CompletionBackend`] is the seam the pipelines
//! depend on; [`ChatClient`] is the OpenAI-compatible HTTP implementation
//! used for both the direct OpenAI endpoint and OpenRouter.

mod client;
pub mod types;

use async_trait::async_trait;

use scribe_shared::Result;

pub use client::ChatClient;

/// Something that turns a prompt into generated text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send `prompt` as a single user message to `model` and return the
    /// first choice's text.
    async fn complete(&self, prompt: &str, model: &str) -> Result<String>;
}

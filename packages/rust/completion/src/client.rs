//! HTTP client for OpenAI-compatible chat completion endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument};

use scribe_shared::{ProviderConfig, Result, ScribeError};

use crate::CompletionBackend;
use crate::types::{ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse};

/// User-Agent string for completion requests.
const USER_AGENT: &str = concat!("scribe/", env!("CARGO_PKG_VERSION"));

/// Chat completion client bound to one provider.
pub struct ChatClient {
    client: Client,
    config: ProviderConfig,
}

impl ChatClient {
    /// Create a client for the given provider.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScribeError::Api(format!("failed to create HTTP client: {e}")))?;

        info!(
            provider = config.kind.as_str(),
            base_url = %config.base_url,
            "completion client ready"
        );

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Build a POST with auth and optional attribution headers.
    fn build_request(&self) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key);

        if let Some(ref referer) = self.config.http_referer {
            req = req.header("HTTP-Referer", referer);
        }
        if let Some(ref title) = self.config.x_title {
            req = req.header("X-Title", title);
        }

        req
    }
}

#[async_trait]
impl CompletionBackend for ChatClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str, model: &str) -> Result<String> {
        let request = ChatCompletionRequest::single_user(model, prompt);

        let response = self
            .build_request()
            .json(&request)
            .send()
            .await
            .map_err(|e| ScribeError::Api(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| "no error details".to_string());
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ScribeError::Api(format!("authentication failed ({status}): {message}"))
                }
                _ => ScribeError::Api(format!(
                    "{} returned {status}: {message}",
                    self.config.kind.as_str()
                )),
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ScribeError::Api(format!("failed to parse response: {e}")))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ScribeError::Api("response contained no choices".into()))?
            .message
            .content
            .unwrap_or_default();

        debug!(response_len = content.len(), "completion received");
        Ok(content)
    }
}

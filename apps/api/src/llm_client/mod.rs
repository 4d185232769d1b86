/// LLM Client — the single point of entry for all Claude API calls in the analyzer.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through `CompletionBackend`.
///
/// This module returns the model's text untouched. Turning it into typed values is
/// `crate::extraction`'s job; nothing here parses model output.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::RawModelResponse;

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 2048;
const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// An image sent alongside a text instruction.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub media_type: &'static str,
    pub data: Bytes,
}

/// The seam between the analysis path and the completion transport.
///
/// Carried in `AppState` as `Arc<dyn CompletionBackend>`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Text-only completion.
    async fn complete_text(&self, system: &str, prompt: &str)
        -> Result<RawModelResponse, LlmError>;

    /// Completion over an image followed by a text instruction.
    async fn complete_with_image(
        &self,
        system: &str,
        instruction: &str,
        image: &ImageAttachment,
    ) -> Result<RawModelResponse, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentPart<'a> {
    Text { text: &'a str },
    Image { source: ImageSource<'a> },
}

#[derive(Debug, Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'a str,
    data: String,
}

impl<'a> ContentPart<'a> {
    fn image(image: &'a ImageAttachment) -> Self {
        ContentPart::Image {
            source: ImageSource {
                source_type: "base64",
                media_type: image.media_type,
                data: base64::engine::general_purpose::STANDARD.encode(&image.data),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }

    /// The first text block as a raw model response. Missing or blank text is an upstream failure.
    pub fn into_raw(self) -> Result<RawModelResponse, LlmError> {
        self.text()
            .filter(|t| !t.trim().is_empty())
            .map(RawModelResponse::from)
            .ok_or(LlmError::EmptyContent)
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The Anthropic-backed completion client.
/// Wraps the Messages API with retry logic on rate limits and server errors.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
        })
    }

    /// Makes a raw call to the Claude API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    async fn call(
        &self,
        system: &str,
        content: Vec<ContentPart<'_>>,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = build_request(system, content);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_ATTEMPTS,
        }))
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete_text(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<RawModelResponse, LlmError> {
        self.call(system, vec![ContentPart::Text { text: prompt }])
            .await?
            .into_raw()
    }

    async fn complete_with_image(
        &self,
        system: &str,
        instruction: &str,
        image: &ImageAttachment,
    ) -> Result<RawModelResponse, LlmError> {
        // Image before text, as the Messages API recommends for vision prompts.
        let content = vec![
            ContentPart::image(image),
            ContentPart::Text { text: instruction },
        ];
        self.call(system, content).await?.into_raw()
    }
}

fn build_request<'a>(system: &'a str, content: Vec<ContentPart<'a>>) -> AnthropicRequest<'a> {
    AnthropicRequest {
        model: MODEL,
        max_tokens: MAX_TOKENS,
        system,
        messages: vec![AnthropicMessage {
            role: "user",
            content,
        }],
    }
}

/// Pulls `error.message` out of an Anthropic error body, falling back to the body itself.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<AnthropicError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

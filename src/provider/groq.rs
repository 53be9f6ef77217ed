//! The Groq-compatible backend.
//!
//! Groq speaks the same completion wire format but accepts only flat
//! `{role, content}` string pairs. Image blocks cannot be represented;
//! flattening discards them and accounts for every dropped block. This
//! is an explicit, documented capability gap, not an error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client as ReqwestClient;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::observability::{
    PROVIDER_DROPPED_IMAGE_BLOCKS, PROVIDER_REQUEST_ERRORS, PROVIDER_REQUESTS,
};
use crate::provider::sse::fragment_stream;
use crate::provider::{
    FragmentStream, GenerationParams, StreamingChatProvider, map_request_error,
    process_error_response,
};
use crate::types::{ContentBlock, ProviderKind, Role, Turn};

const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1/";

/// A streaming-completion request in the flattened wire shape.
#[derive(Debug, Serialize)]
pub(crate) struct FlatChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<FlatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

/// One `{role, content}` pair.
#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct FlatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Flattens turns to `{role, content}` pairs, prefixing the optional
/// system prompt.
///
/// Returns the flattened messages and the number of discarded image
/// blocks. A turn left with no text at all is dropped entirely.
pub(crate) fn flatten_messages(
    turns: &[Turn],
    system: Option<&str>,
) -> (Vec<FlatMessage>, u64) {
    let mut messages = Vec::with_capacity(turns.len() + 1);
    let mut dropped = 0u64;
    if let Some(system) = system {
        messages.push(FlatMessage {
            role: Role::System.as_str(),
            content: system.to_string(),
        });
    }
    for turn in turns {
        let mut content = String::new();
        for block in &turn.content {
            match block {
                ContentBlock::Text(text) => content.push_str(&text.text),
                ContentBlock::Image(_) => dropped += 1,
            }
        }
        if content.is_empty() && turn.has_image() {
            continue;
        }
        messages.push(FlatMessage {
            role: turn.role.as_str(),
            content,
        });
    }
    (messages, dropped)
}

/// Adapter for Groq-compatible chat backends.
#[derive(Debug)]
pub struct GroqProvider {
    api_key: String,
    model: String,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
    dropped_blocks: AtomicU64,
}

impl GroqProvider {
    /// Creates a new adapter.
    ///
    /// The key is not validated here; a rejected key surfaces when
    /// streaming begins.
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            model,
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_GROQ_API_URL.to_string()),
            timeout,
            dropped_blocks: AtomicU64::new(0),
        })
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );
        let bearer = format!("Bearer {}", self.api_key);
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&bearer)
                .map_err(|_| Error::authentication("API key contains invalid characters"))?,
        );
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl StreamingChatProvider for GroqProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Groq
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn stream(
        &self,
        turns: &[Turn],
        system: Option<&str>,
        params: &GenerationParams,
    ) -> Result<FragmentStream> {
        let (messages, dropped) = flatten_messages(turns, system);
        if dropped > 0 {
            self.dropped_blocks.fetch_add(dropped, Ordering::Relaxed);
            for _ in 0..dropped {
                PROVIDER_DROPPED_IMAGE_BLOCKS.click();
            }
        }

        let request = FlatChatRequest {
            model: &self.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            stream: true,
        };

        let url = format!("{}chat/completions", self.base_url);

        PROVIDER_REQUESTS.click();
        let response = self
            .client
            .post(&url)
            .headers(self.default_headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                PROVIDER_REQUEST_ERRORS.click();
                map_request_error(e, self.timeout)
            })?;

        if !response.status().is_success() {
            PROVIDER_REQUEST_ERRORS.click();
            return Err(process_error_response(response).await);
        }

        let stream = fragment_stream(response.bytes_stream().boxed());
        Ok(Box::pin(stream))
    }

    fn dropped_blocks(&self) -> u64 {
        self.dropped_blocks.load(Ordering::Relaxed)
    }
}

//! The OpenAI-compatible backend.
//!
//! This backend accepts the full typed turn structure: each turn is sent
//! as an array of content parts, so image blocks travel to the model
//! unchanged.

use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client as ReqwestClient;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::observability::{PROVIDER_REQUEST_ERRORS, PROVIDER_REQUESTS};
use crate::provider::sse::fragment_stream;
use crate::provider::{
    FragmentStream, GenerationParams, StreamingChatProvider, map_request_error,
    process_error_response,
};
use crate::types::{ContentBlock, ProviderKind, Role, Turn};

const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/";

/// A streaming-completion request, OpenAI wire shape.
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

/// One message in a request body.
#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct WireMessage {
    pub role: &'static str,
    pub content: WireContent,
}

/// Message content: a bare string or an array of typed parts.
#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub(crate) enum WireContent {
    Text(String),
    Parts(Vec<WirePart>),
}

/// One typed content part.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type")]
pub(crate) enum WirePart {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct ImageUrl {
    pub url: String,
}

/// Translates turns into the typed-parts request shape, prefixing the
/// optional system prompt.
pub(crate) fn build_messages(turns: &[Turn], system: Option<&str>) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(turns.len() + 1);
    if let Some(system) = system {
        messages.push(WireMessage {
            role: Role::System.as_str(),
            content: WireContent::Text(system.to_string()),
        });
    }
    for turn in turns {
        let parts = turn
            .content
            .iter()
            .map(|block| match block {
                ContentBlock::Text(text) => WirePart::Text {
                    text: text.text.clone(),
                },
                ContentBlock::Image(image) => WirePart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.url.clone(),
                    },
                },
            })
            .collect();
        messages.push(WireMessage {
            role: turn.role.as_str(),
            content: WireContent::Parts(parts),
        });
    }
    messages
}

/// Adapter for OpenAI-compatible chat backends.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

impl OpenAiProvider {
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
            base_url: base_url.unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string()),
            timeout,
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
impl StreamingChatProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
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
        let request = ChatRequest {
            model: &self.model,
            messages: build_messages(turns, system),
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn system_prompt_is_prefixed_as_plain_text() {
        let turns = vec![Turn::user_text("Hi")];
        let messages = build_messages(&turns, Some("Be terse."));

        let json = to_value(&messages).unwrap();
        assert_eq!(
            json,
            json!([
                {"role": "system", "content": "Be terse."},
                {"role": "user", "content": [{"type": "text", "text": "Hi"}]}
            ])
        );
    }

    #[test]
    fn image_turns_keep_typed_parts() {
        let turns = vec![Turn::user_image("data:image/jpeg;base64,AA==")];
        let messages = build_messages(&turns, None);

        let json = to_value(&messages).unwrap();
        assert_eq!(
            json,
            json!([
                {
                    "role": "user",
                    "content": [{
                        "type": "image_url",
                        "image_url": {"url": "data:image/jpeg;base64,AA=="}
                    }]
                }
            ])
        );
    }

    #[test]
    fn request_serialization() {
        let turns = vec![Turn::user_text("Hello")];
        let request = ChatRequest {
            model: "gpt-4-turbo-preview",
            messages: build_messages(&turns, None),
            temperature: 0.7,
            max_tokens: 2048,
            stream: true,
        };

        let json = to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4-turbo-preview");
        assert_eq!(json["stream"], true);
        assert_eq!(json["max_tokens"], 2048);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn provider_reports_kind_and_model() {
        let provider = OpenAiProvider::new(
            "sk-test".to_string(),
            "gpt-4-turbo-preview".to_string(),
            None,
            Duration::from_secs(60),
        )
        .unwrap();
        assert_eq!(provider.kind(), ProviderKind::OpenAi);
        assert_eq!(provider.model_id(), "gpt-4-turbo-preview");
        assert_eq!(provider.dropped_blocks(), 0);
    }
}

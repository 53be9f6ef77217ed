//! Provider adapters: one streaming-completion capability over
//! heterogeneous chat backends.
//!
//! Each backend is selected by the explicit [`ProviderKind`] tag on its
//! model profile, never by substring matching on the identifier.
//! Credentials are not validated at construction; a rejected key surfaces
//! as an authentication error when streaming begins.

mod groq;
mod openai;
mod sse;

pub use groq::GroqProvider;
pub use openai::OpenAiProvider;

use std::pin::Pin;
use std::time::Duration;

use futures::Stream;
use reqwest::Response;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{ModelProfile, ProviderKind, Turn};

/// Default request timeout; the backend call is never left unbounded.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default ceiling on generated tokens per response.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// A lazy sequence of streamed text fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Per-call tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Sampling temperature, 0.0 through 2.0.
    pub temperature: f32,

    /// Ceiling on generated tokens.
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// One streaming-completion capability over a chat backend.
///
/// A stream emits zero or more text fragments and then completes; any
/// transport or auth error ends the stream with that error, and partial
/// output accumulated by the caller is retained, not discarded.
#[async_trait::async_trait]
pub trait StreamingChatProvider: Send + Sync + std::fmt::Debug {
    /// The backend family this adapter speaks to.
    fn kind(&self) -> ProviderKind;

    /// The model identifier requests are issued for.
    fn model_id(&self) -> &str;

    /// Opens a streaming completion over `turns`, optionally prefixed by
    /// a system prompt.
    async fn stream(
        &self,
        turns: &[Turn],
        system: Option<&str>,
        params: &GenerationParams,
    ) -> Result<FragmentStream>;

    /// Content blocks dropped by request-shape translation since this
    /// adapter was built. Non-zero only for backends that cannot accept
    /// every block type.
    fn dropped_blocks(&self) -> u64 {
        0
    }
}

/// Builds the adapter for a model profile.
///
/// Adapters are not hot-swappable: whenever the API key or the model
/// changes, the owner rebuilds through this factory. An empty key is
/// rejected here, before any network call; an *invalid* key is only
/// discovered when streaming begins.
pub fn build_provider(
    api_key: &str,
    profile: &ModelProfile,
    base_url: Option<&str>,
    timeout: Duration,
) -> Result<Box<dyn StreamingChatProvider>> {
    if api_key.is_empty() {
        return Err(Error::empty_input("an API key is required"));
    }
    match profile.provider {
        ProviderKind::OpenAi => Ok(Box::new(OpenAiProvider::new(
            api_key.to_string(),
            profile.id.clone(),
            base_url.map(String::from),
            timeout,
        )?)),
        ProviderKind::Groq => Ok(Box::new(GroqProvider::new(
            api_key.to_string(),
            profile.id.clone(),
            base_url.map(String::from),
            timeout,
        )?)),
    }
}

/// Maps a reqwest transport error to our error type.
pub(crate) fn map_request_error(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::timeout(
            format!("Request timed out: {err}"),
            Some(timeout.as_secs_f64()),
        )
    } else if err.is_connect() {
        Error::connection(format!("Connection error: {err}"), Some(Box::new(err)))
    } else {
        Error::http_client(format!("Request failed: {err}"), Some(Box::new(err)))
    }
}

/// Process API response errors and convert to our Error type.
pub(crate) async fn process_error_response(response: Response) -> Error {
    let status = response.status();
    let status_code = status.as_u16();

    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .map(String::from);

    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.parse::<u64>().ok());

    #[derive(Deserialize)]
    struct ErrorResponse {
        error: Option<ErrorDetail>,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        #[serde(rename = "type")]
        error_type: Option<String>,
        message: Option<String>,
        param: Option<String>,
    }

    let error_body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            return Error::http_client(
                format!("Failed to read error response: {e}"),
                Some(Box::new(e)),
            );
        }
    };

    let parsed_error = serde_json::from_str::<ErrorResponse>(&error_body).ok();
    let error_type = parsed_error
        .as_ref()
        .and_then(|e| e.error.as_ref())
        .and_then(|e| e.error_type.clone());
    let error_message = parsed_error
        .as_ref()
        .and_then(|e| e.error.as_ref())
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| error_body.clone());
    let error_param = parsed_error
        .as_ref()
        .and_then(|e| e.error.as_ref())
        .and_then(|e| e.param.clone());

    match status_code {
        400 => Error::bad_request(error_message, error_param),
        401 => Error::authentication(error_message),
        404 => Error::not_found(error_message, None, None),
        408 => Error::timeout(error_message, None),
        429 => Error::rate_limit(error_message, retry_after),
        500 => Error::internal_server(error_message, request_id),
        502..=504 => Error::service_unavailable(error_message, retry_after),
        _ => Error::api(status_code, error_type, error_message, request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModelCatalog;

    #[test]
    fn empty_key_rejected_before_any_network_call() {
        let catalog = ModelCatalog::builtin();
        let profile = catalog.get("gpt-4-turbo-preview").unwrap();
        let err = build_provider("", profile, None, DEFAULT_TIMEOUT).unwrap_err();
        assert!(err.is_empty_input());
    }

    #[test]
    fn factory_routes_by_provider_kind() {
        let catalog = ModelCatalog::builtin();

        let profile = catalog.get("gpt-4-turbo-preview").unwrap();
        let provider = build_provider("sk-test", profile, None, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(provider.kind(), ProviderKind::OpenAi);
        assert_eq!(provider.model_id(), "gpt-4-turbo-preview");

        let profile = catalog.get("llama3-70b-8192").unwrap();
        let provider = build_provider("gsk-test", profile, None, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(provider.kind(), ProviderKind::Groq);
    }

    #[test]
    fn default_params() {
        let params = GenerationParams::default();
        assert_eq!(params.temperature, 1.0);
        assert_eq!(params.max_tokens, 2048);
    }
}

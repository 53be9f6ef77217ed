//! One-shot image generation.
//!
//! Unlike chat, image generation is a single request/response call: a
//! prompt goes out, a base64-encoded image and a revised prompt come
//! back. No streaming is involved.

use std::time::Duration;

use base64::Engine;
use reqwest::Client as ReqwestClient;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::observability::IMAGE_REQUESTS;
use crate::provider::{map_request_error, process_error_response};

const DEFAULT_IMAGE_API_URL: &str = "https://api.openai.com/v1/";

const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Prefix applied when the caller asks for the prompt to be used as-is,
/// suppressing the backend's automatic prompt expansion.
pub const PROMPT_ENFORCER: &str = "I NEED to test how the tool works with extremely simple prompts. DO NOT add any detail, just use it AS-IS:";

/// Output dimensions.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    /// 1024x1024.
    #[default]
    #[serde(rename = "1024x1024")]
    Square1024,

    /// 1024x1792.
    #[serde(rename = "1024x1792")]
    Portrait1024x1792,

    /// 1792x1024.
    #[serde(rename = "1792x1024")]
    Landscape1792x1024,
}

/// Rendering quality.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    /// Standard quality.
    #[default]
    Standard,

    /// High definition.
    Hd,
}

/// Rendering style.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    /// Hyper-real, dramatic.
    #[default]
    Vivid,

    /// More natural, less dramatic.
    Natural,
}

/// Parameters for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    /// The prompt describing the image.
    pub prompt: String,

    /// Output dimensions.
    pub size: ImageSize,

    /// Rendering quality.
    pub quality: ImageQuality,

    /// Rendering style.
    pub style: ImageStyle,

    /// When set, the prompt is prefixed with [`PROMPT_ENFORCER`] to
    /// suppress automatic expansion.
    pub enforce_prompt: bool,
}

impl ImageRequest {
    /// Creates a request with default size, quality, and style.
    pub fn new<S: Into<String>>(prompt: S) -> Self {
        Self {
            prompt: prompt.into(),
            size: ImageSize::default(),
            quality: ImageQuality::default(),
            style: ImageStyle::default(),
            enforce_prompt: false,
        }
    }

    /// Sets the output size.
    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    /// Sets the rendering quality.
    pub fn with_quality(mut self, quality: ImageQuality) -> Self {
        self.quality = quality;
        self
    }

    /// Sets the rendering style.
    pub fn with_style(mut self, style: ImageStyle) -> Self {
        self.style = style;
        self
    }

    /// Requests the prompt be used as-is.
    pub fn with_enforced_prompt(mut self) -> Self {
        self.enforce_prompt = true;
        self
    }

    /// The prompt text actually sent to the backend.
    pub fn effective_prompt(&self) -> String {
        if self.enforce_prompt {
            format!("{PROMPT_ENFORCER} {}", self.prompt)
        } else {
            self.prompt.clone()
        }
    }
}

/// A generated image.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GeneratedImage {
    /// The base64-encoded image payload.
    pub b64_json: String,

    /// The backend's rewritten version of the prompt.
    #[serde(default)]
    pub revised_prompt: String,
}

impl GeneratedImage {
    /// Decodes the payload into raw image bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.b64_json)
            .map_err(|e| {
                Error::encoding(
                    format!("invalid base64 image payload: {e}"),
                    Some(Box::new(e)),
                )
            })
    }

    /// Renders the payload as a PNG data URI suitable for an image block.
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.b64_json)
    }
}

#[derive(Serialize)]
struct WireImageRequest<'a> {
    model: &'a str,
    prompt: String,
    n: u32,
    size: ImageSize,
    quality: ImageQuality,
    style: ImageStyle,
    response_format: &'a str,
}

#[derive(Deserialize)]
struct WireImageResponse {
    data: Vec<GeneratedImage>,
}

/// Client for the image-generation endpoint.
#[derive(Debug, Clone)]
pub struct ImageGenerator {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

impl ImageGenerator {
    /// Creates a new generator.
    pub fn new(api_key: String, base_url: Option<String>, timeout: Duration) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::empty_input("an API key is required"));
        }
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
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_IMAGE_API_URL.to_string()),
            timeout,
        })
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = format!("Bearer {}", self.api_key);
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&bearer)
                .map_err(|_| Error::authentication("API key contains invalid characters"))?,
        );
        Ok(headers)
    }

    /// Generates one image.
    ///
    /// An empty prompt is rejected before any network call.
    pub async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage> {
        if request.prompt.trim().is_empty() {
            return Err(Error::empty_input("the image prompt is empty"));
        }

        let wire = WireImageRequest {
            model: DEFAULT_IMAGE_MODEL,
            prompt: request.effective_prompt(),
            n: 1,
            size: request.size,
            quality: request.quality,
            style: request.style,
            response_format: "b64_json",
        };

        let url = format!("{}images/generations", self.base_url);

        IMAGE_REQUESTS.click();
        let response = self
            .client
            .post(&url)
            .headers(self.default_headers()?)
            .json(&wire)
            .send()
            .await
            .map_err(|e| map_request_error(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(process_error_response(response).await);
        }

        let parsed: WireImageResponse = response.json().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse image response: {e}"),
                Some(Box::new(e)),
            )
        })?;

        parsed.data.into_iter().next().ok_or_else(|| {
            Error::unknown("the backend returned no image data")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn enum_wire_values() {
        assert_eq!(
            to_value(ImageSize::Portrait1024x1792).unwrap(),
            json!("1024x1792")
        );
        assert_eq!(to_value(ImageQuality::Hd).unwrap(), json!("hd"));
        assert_eq!(to_value(ImageStyle::Natural).unwrap(), json!("natural"));
    }

    #[test]
    fn enforced_prompt_is_prefixed() {
        let request = ImageRequest::new("A duck in a pond").with_enforced_prompt();
        assert_eq!(
            request.effective_prompt(),
            format!("{PROMPT_ENFORCER} A duck in a pond")
        );

        let request = ImageRequest::new("A duck in a pond");
        assert_eq!(request.effective_prompt(), "A duck in a pond");
    }

    #[test]
    fn generated_image_decodes() {
        let image = GeneratedImage {
            b64_json: base64::engine::general_purpose::STANDARD.encode(b"\x89PNG"),
            revised_prompt: "A duck.".to_string(),
        };
        assert_eq!(image.decode().unwrap(), b"\x89PNG");
        assert!(image.data_uri().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn invalid_payload_is_an_encoding_error() {
        let image = GeneratedImage {
            b64_json: "not base64!!!".to_string(),
            revised_prompt: String::new(),
        };
        assert!(image.decode().is_err());
    }

    #[test]
    fn empty_key_rejected() {
        let err = ImageGenerator::new(String::new(), None, Duration::from_secs(60)).unwrap_err();
        assert!(err.is_empty_input());
    }
}

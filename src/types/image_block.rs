use base64::Engine;
use serde::{Deserialize, Serialize};

/// An image reference in a turn.
///
/// The URL is either an inline base64 data URI (the form produced by
/// uploads) or a remote http(s) URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageBlock {
    /// A data URI or remote URL pointing at the image.
    pub url: String,
}

impl ImageBlock {
    /// Creates a new ImageBlock from a data URI or remote URL.
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self { url: url.into() }
    }

    /// Builds an ImageBlock holding an inline data URI from raw image
    /// bytes and a media type such as `image/jpeg`.
    pub fn from_bytes(media_type: &str, data: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        Self {
            url: format!("data:{media_type};base64,{encoded}"),
        }
    }

    /// Returns true if this block carries an inline data URI rather than
    /// a remote URL.
    pub fn is_data_uri(&self) -> bool {
        self.url.starts_with("data:")
    }
}

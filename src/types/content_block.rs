use serde::{Deserialize, Serialize};

use crate::types::{ImageBlock, TextBlock};

/// One unit of turn content.
///
/// Conversations may interleave text and image blocks, though in practice
/// a turn holds exactly one block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// A block of text content.
    #[serde(rename = "text")]
    Text(TextBlock),

    /// An image reference.
    #[serde(rename = "image")]
    Image(ImageBlock),
}

impl ContentBlock {
    /// Creates a text content block.
    pub fn text<S: Into<String>>(text: S) -> Self {
        ContentBlock::Text(TextBlock::new(text))
    }

    /// Creates an image content block.
    pub fn image<S: Into<String>>(url: S) -> Self {
        ContentBlock::Image(ImageBlock::new(url))
    }

    /// Returns true if this block is a text block.
    pub fn is_text(&self) -> bool {
        matches!(self, ContentBlock::Text(_))
    }

    /// Returns true if this block is an image block.
    pub fn is_image(&self) -> bool {
        matches!(self, ContentBlock::Image(_))
    }

    /// Returns a reference to the inner TextBlock if this is a Text
    /// variant, or None otherwise.
    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            ContentBlock::Text(block) => Some(block),
            _ => None,
        }
    }

    /// Returns a reference to the inner ImageBlock if this is an Image
    /// variant, or None otherwise.
    pub fn as_image(&self) -> Option<&ImageBlock> {
        match self {
            ContentBlock::Image(block) => Some(block),
            _ => None,
        }
    }
}

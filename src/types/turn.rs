use serde::{Deserialize, Serialize};

use crate::types::{ContentBlock, ImageBlock, Role, TextBlock};

/// One message exchanged in a conversation.
///
/// A turn carries a role and an ordered sequence of content blocks. A
/// persisted turn always has at least one block; an assistant turn starts
/// with a single empty text block that is mutated in place as tokens
/// stream in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    /// The speaker this turn is attributed to.
    pub role: Role,

    /// The ordered content of the turn.
    pub content: Vec<ContentBlock>,
}

impl Turn {
    /// Creates a turn with the given role and content blocks.
    pub fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Self { role, content }
    }

    /// Creates a user turn holding one text block.
    pub fn user_text<S: Into<String>>(text: S) -> Self {
        Self::new(Role::User, vec![ContentBlock::Text(TextBlock::new(text))])
    }

    /// Creates a user turn holding one image reference.
    pub fn user_image<S: Into<String>>(url: S) -> Self {
        Self::new(Role::User, vec![ContentBlock::Image(ImageBlock::new(url))])
    }

    /// Creates an assistant turn with a single empty text block, ready to
    /// accumulate streamed fragments.
    pub fn assistant_empty() -> Self {
        Self::new(Role::Assistant, vec![ContentBlock::Text(TextBlock::empty())])
    }

    /// Creates a system turn holding one text block.
    pub fn system<S: Into<String>>(text: S) -> Self {
        Self::new(Role::System, vec![ContentBlock::Text(TextBlock::new(text))])
    }

    /// Appends a streamed fragment to the first text block of this turn.
    ///
    /// Returns false if the turn holds no text block to append to.
    pub fn push_text(&mut self, fragment: &str) -> bool {
        for block in &mut self.content {
            if let ContentBlock::Text(text) = block {
                text.text.push_str(fragment);
                return true;
            }
        }
        false
    }

    /// Concatenates the text of every text block in this turn.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for block in &self.content {
            if let ContentBlock::Text(text) = block {
                out.push_str(&text.text);
            }
        }
        out
    }

    /// Returns true if this turn holds at least one text block.
    pub fn has_text(&self) -> bool {
        self.content.iter().any(ContentBlock::is_text)
    }

    /// Returns true if this turn holds at least one image block.
    pub fn has_image(&self) -> bool {
        self.content.iter().any(ContentBlock::is_image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn user_text_turn() {
        let turn = Turn::user_text("What is up?");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content.len(), 1);
        assert_eq!(turn.text(), "What is up?");
    }

    #[test]
    fn assistant_turn_accumulates_fragments() {
        let mut turn = Turn::assistant_empty();
        assert_eq!(turn.text(), "");
        assert!(turn.push_text("Hel"));
        assert!(turn.push_text("lo"));
        assert_eq!(turn.text(), "Hello");
        assert_eq!(turn.content.len(), 1);
    }

    #[test]
    fn push_text_without_text_block() {
        let mut turn = Turn::user_image("data:image/png;base64,AA==");
        assert!(!turn.push_text("nope"));
        assert_eq!(turn.text(), "");
        assert!(turn.has_image());
        assert!(!turn.has_text());
    }

    #[test]
    fn serialization_shape() {
        let turn = Turn::user_text("Hi");
        let json = to_value(&turn).unwrap();
        assert_eq!(
            json,
            json!({
                "role": "user",
                "content": [{"type": "text", "text": "Hi"}]
            })
        );
    }
}

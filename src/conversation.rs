//! The message store: an ordered sequence of turns owned by one session.

use crate::error::{Error, Result};
use crate::types::Turn;

/// An ordered sequence of turns, insertion order = display order.
///
/// The session controller is the sole writer. Turns are appended on user
/// input, on assistant-response start, and on image upload; they are
/// removed from the tail by delete-last and regenerate.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Appends a turn.
    ///
    /// A turn with no content blocks is rejected: the store never holds
    /// an empty turn.
    pub fn push(&mut self, turn: Turn) -> Result<()> {
        if turn.content.is_empty() {
            return Err(Error::validation(
                "a turn must carry at least one content block",
                Some("content".to_string()),
            ));
        }
        self.turns.push(turn);
        Ok(())
    }

    /// Removes and returns the last turn.
    pub fn pop_last(&mut self) -> Result<Turn> {
        self.turns.pop().ok_or_else(|| {
            Error::not_found(
                "the conversation is empty",
                Some("turn".to_string()),
                None,
            )
        })
    }

    /// Clears every turn.
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    /// Returns the number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns true if the conversation holds no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Iterates the turns in display order.
    ///
    /// The iterator reflects current state at call time; it is not a
    /// snapshot.
    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Returns the turns as a slice.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Returns the last turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Returns the last turn for mutation, if any.
    pub fn last_mut(&mut self) -> Option<&mut Turn> {
        self.turns.last_mut()
    }
}

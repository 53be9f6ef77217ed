//! Streaming chat-session core.
//!
//! This crate implements the reusable heart of a chat UI over hosted
//! language-model backends: an ordered conversation store, a pure cost
//! estimator, streaming provider adapters for heterogeneous backends,
//! and a session controller that orchestrates turn-taking and pushes
//! incremental output to a display observer. A one-shot image-generation
//! client rides along.

// Public modules
pub mod chat;
pub mod conversation;
pub mod cost;
pub mod error;
pub mod image;
pub mod observability;
pub mod provider;
pub mod render;
pub mod types;

// Re-exports
pub use chat::{ChatSession, GenerationOutcome, SessionConfig, SessionStats, StreamState};
pub use conversation::Conversation;
pub use cost::{CostEstimator, TokenCounter, format_cost};
pub use error::{Error, Result};
pub use provider::{
    FragmentStream, GenerationParams, StreamingChatProvider, build_provider,
};
pub use render::{DisplayObserver, NullObserver, PlainTextObserver};
pub use types::*;

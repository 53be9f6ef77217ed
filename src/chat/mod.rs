//! The session-controller layer: configuration, slash commands, and the
//! chat session itself.
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing, session configuration, secrets
//! - [`commands`]: slash command parsing for the REPL
//! - [`session`]: conversation state, cost accounting, turn-taking

mod commands;
mod config;
mod session;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, SecretStore, SessionConfig};
pub use session::{ChatSession, GenerationOutcome, SessionStats, StreamState};

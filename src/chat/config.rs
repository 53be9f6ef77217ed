//! Configuration for chat sessions.
//!
//! This module provides CLI argument parsing via `arrrg`, the resolved
//! session configuration, and the shared-password secret store.

use std::time::Duration;

use arrrg_derive::CommandLine;
use constant_time_eq::constant_time_eq;

use crate::provider::DEFAULT_MAX_TOKENS;
use crate::types::ProviderKind;

/// Default model offered by the UI.
const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";

/// Default request timeout; a hung backend stream must not hang the
/// session forever.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Command-line arguments for the colloquy-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gpt-4-turbo-preview)", "MODEL")]
    pub model: Option<String>,

    /// System prompt to set context for the conversation.
    #[arrrg(optional, "System prompt for the conversation", "PROMPT")]
    pub system: Option<String>,

    /// API key for the backend.
    #[arrrg(optional, "API key (default: COLLOQUY_API_KEY env var)", "KEY")]
    pub api_key: Option<String>,

    /// Sampling temperature.
    #[arrrg(optional, "Sampling temperature, 0.0-2.0 (default: 1.0)", "TEMP")]
    pub temperature: Option<String>,

    /// Path to a YAML model catalog with pricing.
    #[arrrg(optional, "Path to a YAML model catalog", "PATH")]
    pub catalog: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Resolved configuration for a chat session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The model identifier generation requests are issued for.
    pub model: String,

    /// API key for the backend; required before the first generation.
    pub api_key: Option<String>,

    /// Optional system prompt prepended ahead of the visible history.
    /// An empty string behaves as no prompt.
    pub system_prompt: Option<String>,

    /// Sampling temperature, 0.0 through 2.0.
    pub temperature: f32,

    /// Ceiling on generated tokens per response.
    pub max_tokens: u32,

    /// Timeout applied to every backend request.
    pub request_timeout: Duration,

    /// Override for the backend base URL (used by tests).
    pub base_url: Option<String>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl SessionConfig {
    /// Creates a configuration with default values.
    ///
    /// Defaults:
    /// - Model: gpt-4-turbo-preview
    /// - Temperature: 1.0
    /// - Max tokens: 2048
    /// - Request timeout: 60 seconds
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            system_prompt: None,
            temperature: 1.0,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout: DEFAULT_TIMEOUT,
            base_url: None,
            use_color: true,
        }
    }

    /// Sets the model identifier.
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the API key.
    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the maximum tokens per response.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Overrides the backend base URL.
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for SessionConfig {
    fn from(args: ChatArgs) -> Self {
        let temperature = args
            .temperature
            .and_then(|s| s.parse::<f32>().ok())
            .filter(|t| (0.0..=2.0).contains(t))
            .unwrap_or(1.0);

        SessionConfig {
            model: args.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: args.api_key,
            system_prompt: args.system,
            temperature,
            use_color: !args.no_color,
            ..SessionConfig::new()
        }
    }
}

/// Stored secrets: a shared password and the per-provider backend keys it
/// unlocks.
///
/// Not an authentication system. One constant-time comparison, one key
/// substitution.
#[derive(Debug, Clone, Default)]
pub struct SecretStore {
    /// The shared password sentinel.
    pub password: String,

    /// Backend key handed out for OpenAI-compatible providers.
    pub openai_api_key: String,

    /// Backend key handed out for Groq-compatible providers.
    pub groq_api_key: String,
}

impl SecretStore {
    /// Resolves the key to use for a provider.
    ///
    /// If the supplied key equals the shared password (compared in
    /// constant time), the stored backend key for `kind` is substituted;
    /// otherwise the supplied key is used as-is.
    pub fn resolve_api_key(&self, supplied: &str, kind: ProviderKind) -> String {
        if !self.password.is_empty()
            && constant_time_eq(supplied.as_bytes(), self.password.as_bytes())
        {
            match kind {
                ProviderKind::OpenAi => self.openai_api_key.clone(),
                ProviderKind::Groq => self.groq_api_key.clone(),
            }
        } else {
            supplied.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SessionConfig::new();
        assert_eq!(config.model, "gpt-4-turbo-preview");
        assert_eq!(config.temperature, 1.0);
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.api_key.is_none());
        assert!(config.system_prompt.is_none());
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_defaults() {
        let args = ChatArgs::default();
        let config = SessionConfig::from(args);
        assert_eq!(config.model, "gpt-4-turbo-preview");
        assert_eq!(config.temperature, 1.0);
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            model: Some("llama3-70b-8192".to_string()),
            system: Some("You are helpful.".to_string()),
            api_key: Some("gsk-test".to_string()),
            temperature: Some("0.25".to_string()),
            catalog: None,
            no_color: true,
        };
        let config = SessionConfig::from(args);
        assert_eq!(config.model, "llama3-70b-8192");
        assert_eq!(config.system_prompt, Some("You are helpful.".to_string()));
        assert_eq!(config.api_key, Some("gsk-test".to_string()));
        assert_eq!(config.temperature, 0.25);
        assert!(!config.use_color);
    }

    #[test]
    fn out_of_range_temperature_falls_back() {
        let args = ChatArgs {
            temperature: Some("7.5".to_string()),
            ..ChatArgs::default()
        };
        let config = SessionConfig::from(args);
        assert_eq!(config.temperature, 1.0);
    }

    #[test]
    fn config_builder_pattern() {
        let config = SessionConfig::new()
            .with_model("gpt-4-vision-preview")
            .with_api_key("sk-test")
            .with_system_prompt("Test prompt")
            .with_temperature(0.6)
            .with_max_tokens(1024)
            .with_request_timeout(Duration::from_secs(30))
            .without_color();

        assert_eq!(config.model, "gpt-4-vision-preview");
        assert_eq!(config.api_key, Some("sk-test".to_string()));
        assert_eq!(config.system_prompt, Some("Test prompt".to_string()));
        assert_eq!(config.temperature, 0.6);
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.use_color);
    }

    #[test]
    fn shared_password_unlocks_backend_key() {
        let secrets = SecretStore {
            password: "open sesame".to_string(),
            openai_api_key: "sk-real".to_string(),
            groq_api_key: "gsk-real".to_string(),
        };

        assert_eq!(
            secrets.resolve_api_key("open sesame", ProviderKind::OpenAi),
            "sk-real"
        );
        assert_eq!(
            secrets.resolve_api_key("open sesame", ProviderKind::Groq),
            "gsk-real"
        );
        assert_eq!(
            secrets.resolve_api_key("sk-mine", ProviderKind::OpenAi),
            "sk-mine"
        );
    }

    #[test]
    fn empty_password_never_matches() {
        let secrets = SecretStore::default();
        assert_eq!(secrets.resolve_api_key("", ProviderKind::OpenAi), "");
    }
}

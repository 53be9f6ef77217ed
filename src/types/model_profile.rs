use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The backend family a model is served by.
///
/// Routing is decided by this tag at configuration time, never by
/// substring matching on the model identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// An OpenAI-compatible backend that accepts typed content blocks.
    OpenAi,

    /// A Groq-compatible backend that accepts flattened text-only turns.
    Groq,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Groq => write!(f, "groq"),
        }
    }
}

/// The BPE vocabulary used for token counting.
///
/// Every shipped profile uses `cl100k_base` regardless of the actual
/// model; this is a known approximation, not a billing reconciliation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerFamily {
    /// The cl100k_base vocabulary.
    #[default]
    Cl100kBase,
}

/// Static per-model metadata used for routing and cost estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    /// The model identifier sent to the backend.
    pub id: String,

    /// The backend family serving this model.
    pub provider: ProviderKind,

    /// Input cost in USD per million tokens.
    pub input_cost_per_mtok: f64,

    /// Whether the model accepts image input.
    #[serde(default)]
    pub vision: bool,

    /// The tokenizer family used for estimation.
    #[serde(default)]
    pub tokenizer: TokenizerFamily,
}

impl ModelProfile {
    /// Creates a new profile.
    pub fn new<S: Into<String>>(id: S, provider: ProviderKind, input_cost_per_mtok: f64) -> Self {
        Self {
            id: id.into(),
            provider,
            input_cost_per_mtok,
            vision: false,
            tokenizer: TokenizerFamily::Cl100kBase,
        }
    }

    /// Marks the profile as accepting image input.
    pub fn with_vision(mut self) -> Self {
        self.vision = true;
        self
    }
}

/// An ordered table of model profiles, loaded at startup and immutable
/// afterwards.
///
/// Pricing is configuration: the built-in table carries published prices,
/// and `from_yaml_str`/`from_yaml_file` replace it wholesale from an
/// external file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCatalog {
    /// The profiles, in display order.
    pub models: Vec<ModelProfile>,
}

impl ModelCatalog {
    /// Creates a catalog from an explicit list of profiles.
    pub fn new(models: Vec<ModelProfile>) -> Self {
        Self { models }
    }

    /// The built-in catalog: the OpenAI models the UI offers plus the
    /// Groq-served open models, with published per-million-token prices.
    pub fn builtin() -> Self {
        Self::new(vec![
            ModelProfile::new("gpt-3.5-turbo", ProviderKind::OpenAi, 0.5),
            ModelProfile::new("gpt-4-turbo-preview", ProviderKind::OpenAi, 10.0),
            ModelProfile::new("gpt-4-1106-preview", ProviderKind::OpenAi, 10.0),
            ModelProfile::new("gpt-4-vision-preview", ProviderKind::OpenAi, 10.0).with_vision(),
            ModelProfile::new("llama3-8b-8192", ProviderKind::Groq, 0.05),
            ModelProfile::new("llama3-70b-8192", ProviderKind::Groq, 0.59),
            ModelProfile::new("mixtral-8x7b-32768", ProviderKind::Groq, 0.24),
        ])
    }

    /// Parses a catalog from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|err| {
            Error::serialization(
                format!("failed to parse model catalog: {err}"),
                Some(Box::new(err)),
            )
        })
    }

    /// Loads a catalog from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|err| Error::io("failed to read model catalog", err))?;
        Self::from_yaml_str(&text)
    }

    /// Looks up a profile by model identifier.
    pub fn get(&self, id: &str) -> Result<&ModelProfile> {
        self.models.iter().find(|m| m.id == id).ok_or_else(|| {
            Error::not_found(
                format!("model '{id}' is not in the catalog"),
                Some("model".to_string()),
                Some(id.to_string()),
            )
        })
    }

    /// Returns the model identifiers in display order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.id.as_str())
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

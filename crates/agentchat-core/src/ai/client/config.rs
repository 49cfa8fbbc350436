//! AI Client configuration

use std::fmt;
use std::str::FromStr;

use crate::ai::providers::{chat_completions_url, ProviderId};

/// Reasoning effort hint sent as `reasoning_effort`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReasoningEffort {
    Low,
    Medium,
    #[default]
    High,
}

impl ReasoningEffort {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for ReasoningEffort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown reasoning effort '{}'", other)),
        }
    }
}

/// Configuration for the AI client
#[derive(Clone)]
pub struct AiClientConfig {
    pub provider_id: ProviderId,
    /// Model ID to use for API calls
    pub model: String,
    /// Base URL without the `/chat/completions` suffix
    pub base_url: String,
    pub api_key: String,
    /// `None` omits the parameter entirely
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl AiClientConfig {
    /// Defaults for a provider with the given key
    pub fn for_provider(provider_id: ProviderId, api_key: impl Into<String>) -> Self {
        Self {
            provider_id,
            model: provider_id.default_model().to_string(),
            base_url: provider_id.default_base_url().to_string(),
            api_key: api_key.into(),
            reasoning_effort: Some(ReasoningEffort::default()),
        }
    }

    /// Full chat/completions URL
    pub fn api_url(&self) -> String {
        chat_completions_url(&self.base_url)
    }
}

// Keep the key out of logs
impl fmt::Debug for AiClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiClientConfig")
            .field("provider_id", &self.provider_id)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("reasoning_effort", &self.reasoning_effort)
            .finish()
    }
}

//! AI provider configuration
//!
//! Built-in registry of the OpenAI-compatible endpoints the server can talk to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for each supported provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    #[default]
    Kimi,
    Gemini,
    OpenRouter,
}

impl ProviderId {
    /// Get all available provider IDs, default first
    pub fn all() -> &'static [ProviderId] {
        &[ProviderId::Kimi, ProviderId::Gemini, ProviderId::OpenRouter]
    }

    /// Key used in `LLM_PROVIDER`
    pub fn storage_key(&self) -> &'static str {
        match self {
            ProviderId::Kimi => "kimi",
            ProviderId::Gemini => "gemini",
            ProviderId::OpenRouter => "openrouter",
        }
    }

    /// Environment variable holding the credential
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderId::Kimi => "KIMI_API_KEY",
            ProviderId::Gemini => "GEMINI_API_KEY",
            ProviderId::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::Kimi => "https://api.moonshot.cn/v1",
            ProviderId::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai/",
            ProviderId::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::Kimi => "kimi-k2-thinking-turbo",
            ProviderId::Gemini => "gemini-2.5-flash",
            ProviderId::OpenRouter => "openrouter/polaris-alpha",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::Kimi => write!(f, "Kimi"),
            ProviderId::Gemini => write!(f, "Gemini"),
            ProviderId::OpenRouter => write!(f, "OpenRouter"),
        }
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        ProviderId::all()
            .iter()
            .copied()
            .find(|p| p.storage_key() == key)
            .ok_or_else(|| format!("unknown provider '{}'", s.trim()))
    }
}

/// Join a base URL and the chat-completions path
pub fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

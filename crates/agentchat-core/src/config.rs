//! Environment configuration
//!
//! Read once at startup into an immutable [`AppConfig`]. Loading goes through a
//! lookup function so tests never touch the process environment.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;

use crate::ai::client::{AiClientConfig, ReasoningEffort};
use crate::ai::providers::ProviderId;
use crate::constants::ai::DEFAULT_MAX_ITERATIONS;
use crate::tools::registry::disable_env_var;

/// Names of the tools that ship with the crate
pub const BUILTIN_TOOL_NAMES: &[&str] = &["fetch_url", "brave_search", "read_file"];

const DEFAULT_PORT: u16 = 3000;
const DISABLE_PREFIX: &str = "TOOL_DISABLE_";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown LLM_PROVIDER '{0}' (expected kimi, gemini or openrouter)")]
    UnknownProvider(String),

    #[error("Invalid {var}='{value}': {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Missing {0}")]
    MissingCredential(&'static str),
}

/// Provider selection and credentials
#[derive(Clone)]
pub struct ProviderSettings {
    pub id: ProviderId,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl ProviderSettings {
    /// Client config, or [`ConfigError::MissingCredential`] naming the variable
    pub fn client_config(&self) -> Result<AiClientConfig, ConfigError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or(ConfigError::MissingCredential(self.id.api_key_env()))?;
        Ok(AiClientConfig {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            reasoning_effort: self.reasoning_effort,
            ..AiClientConfig::for_provider(self.id, api_key)
        })
    }
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("id", &self.id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("reasoning_effort", &self.reasoning_effort)
            .finish()
    }
}

/// Which tools are available and where file tools may look
#[derive(Clone, Default)]
pub struct ToolSettings {
    /// Tool names disabled through `TOOL_DISABLE_<NAME>`
    pub disabled: HashSet<String>,
    pub brave_api_key: Option<String>,
    pub project_root: PathBuf,
}

impl std::fmt::Debug for ToolSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSettings")
            .field("disabled", &self.disabled)
            .field("brave_api_key", &self.brave_api_key.as_ref().map(|_| "<redacted>"))
            .field("project_root", &self.project_root)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ProviderSettings,
    pub tools: ToolSettings,
    /// Cap on tool rounds per request, at least 1
    pub max_tool_iterations: usize,
    pub port: u16,
}

impl AppConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Pick up flags for tools registered outside this crate too
        config
            .tools
            .disabled
            .extend(disabled_by_flags(std::env::vars_os()));
        Ok(config)
    }

    /// Load through an arbitrary lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let id = match get("LLM_PROVIDER") {
            Some(name) => name
                .parse::<ProviderId>()
                .map_err(|_| ConfigError::UnknownProvider(name))?,
            None => ProviderId::default(),
        };

        let reasoning_effort = match get("LLM_REASONING_EFFORT") {
            None => Some(ReasoningEffort::default()),
            Some(v) if v.eq_ignore_ascii_case("none") => None,
            Some(v) => Some(v.parse::<ReasoningEffort>().map_err(|reason| {
                ConfigError::InvalidValue {
                    var: "LLM_REASONING_EFFORT",
                    value: v.clone(),
                    reason,
                }
            })?),
        };

        let provider = ProviderSettings {
            id,
            api_key: get(id.api_key_env()),
            model: get("LLM_MODEL").unwrap_or_else(|| id.default_model().to_string()),
            base_url: get("LLM_BASE_URL").unwrap_or_else(|| id.default_base_url().to_string()),
            reasoning_effort,
        };

        let max_tool_iterations = match get("MAX_TOOL_ITERATIONS") {
            None => DEFAULT_MAX_ITERATIONS,
            Some(v) => match v.parse::<usize>() {
                Ok(n) if n >= 1 => n,
                Ok(_) => {
                    return Err(ConfigError::InvalidValue {
                        var: "MAX_TOOL_ITERATIONS",
                        value: v,
                        reason: "must be at least 1".to_string(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::InvalidValue {
                        var: "MAX_TOOL_ITERATIONS",
                        value: v,
                        reason: e.to_string(),
                    })
                }
            },
        };

        let port = match get("PORT") {
            None => DEFAULT_PORT,
            Some(v) => v.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                var: "PORT",
                value: v.clone(),
                reason: e.to_string(),
            })?,
        };

        let disabled = BUILTIN_TOOL_NAMES
            .iter()
            .filter(|name| get(&disable_env_var(name)).is_some_and(|v| is_true(&v)))
            .map(|name| name.to_string())
            .collect();

        let project_root = get("PROJECT_ROOT")
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            provider,
            tools: ToolSettings {
                disabled,
                brave_api_key: get("BRAVE_API_KEY"),
                project_root,
            },
            max_tool_iterations,
            port,
        })
    }
}

fn is_true(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Tool names switched off by `TOOL_DISABLE_<NAME>=true`. Entries that are not
/// valid Unicode cannot be flags and are skipped.
fn disabled_by_flags<I>(vars: I) -> Vec<String>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| {
            let name = key.to_str()?.strip_prefix(DISABLE_PREFIX)?;
            is_true(value.to_str()?).then(|| name.to_ascii_lowercase())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.provider.id, ProviderId::Kimi);
        assert_eq!(config.provider.model, "kimi-k2-thinking-turbo");
        assert_eq!(config.provider.base_url, "https://api.moonshot.cn/v1");
        assert_eq!(config.provider.reasoning_effort, Some(ReasoningEffort::High));
        assert!(config.provider.api_key.is_none());
        assert_eq!(config.max_tool_iterations, 5);
        assert_eq!(config.port, 3000);
        assert!(config.tools.disabled.is_empty());
        assert!(config.tools.brave_api_key.is_none());
    }

    #[test]
    fn provider_selection_and_overrides() {
        let config = load(&[
            ("LLM_PROVIDER", " OpenRouter "),
            ("OPENROUTER_API_KEY", "sk-or"),
            ("KIMI_API_KEY", "sk-kimi"),
            ("LLM_MODEL", "some/model"),
            ("LLM_REASONING_EFFORT", "none"),
        ])
        .unwrap();
        assert_eq!(config.provider.id, ProviderId::OpenRouter);
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-or"));
        assert_eq!(config.provider.model, "some/model");
        assert_eq!(config.provider.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.provider.reasoning_effort, None);

        let client = config.provider.client_config().unwrap();
        assert_eq!(client.api_url(), "https://openrouter.ai/api/v1/chat/completions");
    }

    #[test]
    fn missing_credential_is_not_a_load_error() {
        let config = load(&[("LLM_PROVIDER", "gemini")]).unwrap();
        assert_eq!(
            config.provider.client_config().unwrap_err(),
            ConfigError::MissingCredential("GEMINI_API_KEY")
        );
        assert_eq!(
            config.provider.client_config().unwrap_err().to_string(),
            "Missing GEMINI_API_KEY"
        );
    }

    #[test]
    fn rejects_unknown_provider() {
        assert_eq!(
            load(&[("LLM_PROVIDER", "anthropic")]).unwrap_err(),
            ConfigError::UnknownProvider("anthropic".into())
        );
    }

    #[test]
    fn rejects_bad_iteration_cap() {
        assert!(matches!(
            load(&[("MAX_TOOL_ITERATIONS", "0")]),
            Err(ConfigError::InvalidValue { var: "MAX_TOOL_ITERATIONS", .. })
        ));
        assert!(matches!(
            load(&[("MAX_TOOL_ITERATIONS", "lots")]),
            Err(ConfigError::InvalidValue { var: "MAX_TOOL_ITERATIONS", .. })
        ));
        assert_eq!(load(&[("MAX_TOOL_ITERATIONS", "8")]).unwrap().max_tool_iterations, 8);
    }

    #[test]
    fn disable_flags_and_brave_key() {
        let config = load(&[
            ("TOOL_DISABLE_FETCH_URL", "true"),
            ("TOOL_DISABLE_READ_FILE", "false"),
            ("BRAVE_API_KEY", "bk"),
            ("PROJECT_ROOT", "/srv/project"),
        ])
        .unwrap();
        assert!(config.tools.disabled.contains("fetch_url"));
        assert!(!config.tools.disabled.contains("read_file"));
        assert_eq!(config.tools.brave_api_key.as_deref(), Some("bk"));
        assert_eq!(config.tools.project_root, PathBuf::from("/srv/project"));
    }

    #[cfg(unix)]
    #[test]
    fn flag_scan_skips_non_unicode_entries() {
        use std::os::unix::ffi::OsStringExt;

        let vars = vec![
            (OsString::from("JUNK"), OsString::from_vec(vec![0xff, 0xfe])),
            (OsString::from_vec(vec![0xff]), OsString::from("true")),
            (OsString::from("TOOL_DISABLE_BROWSER"), OsString::from(" TRUE ")),
            (OsString::from("TOOL_DISABLE_SHELL"), OsString::from_vec(vec![0xff])),
            (OsString::from("TOOL_DISABLE_READ_FILE"), OsString::from("no")),
        ];
        assert_eq!(disabled_by_flags(vars), vec!["browser".to_string()]);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = load(&[("KIMI_API_KEY", "sk-secret"), ("BRAVE_API_KEY", "brave-secret")]).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-secret"));
        assert!(!printed.contains("brave-secret"));
    }
}

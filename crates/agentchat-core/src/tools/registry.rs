//! Tool registry for managing available tools
//!
//! The registry is filled once at startup and shared read-only afterwards.
//! Invocation never fails: unknown tools, timeouts, panics and tool failures
//! all come back as an error-flagged [`ToolResult`] the model can read.

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::agent::hooks::{LoggingHook, PostToolHook};
use crate::ai::types::AiTool;
use crate::constants::tools::DEFAULT_TOOL_TIMEOUT;

/// Tool execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub output: String,
    pub is_error: bool,
}

impl ToolResult {
    /// Create a success result
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
        }
    }

    /// Create an error result; the message is what the model sees
    pub fn error(msg: impl std::fmt::Display) -> Self {
        Self {
            output: msg.to_string(),
            is_error: true,
        }
    }

    /// Create an invalid-parameters error.
    pub fn invalid_parameters(msg: impl std::fmt::Display) -> Self {
        Self::error(format!("Invalid parameters: {}", msg))
    }
}

/// Parse tool parameters, returning a ToolResult error on failure
pub fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, ToolResult> {
    serde_json::from_value(params).map_err(ToolResult::invalid_parameters)
}

/// Context for tool execution
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Root that file tools are confined to
    pub project_root: PathBuf,
    /// Optional per-call timeout override
    pub timeout: Option<Duration>,
}

impl Default for ToolContext {
    fn default() -> Self {
        Self {
            project_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            timeout: None,
        }
    }
}

impl ToolContext {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Trait for tool implementations
///
/// Implementations must catch their own failures and report them through
/// [`ToolResult::error`]. Each call must be self-contained: concurrent
/// conversations may invoke the same tool at once.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (id)
    fn name(&self) -> &str;

    /// Tool description for AI
    fn description(&self) -> &str;

    /// JSON schema for parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool
    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult;
}

/// Environment variable that disables a tool by name
pub fn disable_env_var(tool_name: &str) -> String {
    format!("TOOL_DISABLE_{}", tool_name.to_ascii_uppercase())
}

/// Registry for managing tools with hook support
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Schemas in registration order
    schemas: Vec<AiTool>,
    disabled: HashSet<String>,
    /// Default timeout for tool execution
    default_timeout: Duration,
    /// Post-execution hooks (run after each tool)
    post_hooks: Vec<Arc<dyn PostToolHook>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            schemas: Vec::new(),
            disabled: HashSet::new(),
            default_timeout: DEFAULT_TOOL_TIMEOUT,
            post_hooks: vec![Arc::new(LoggingHook)],
        }
    }

    /// Tools whose names appear here are skipped by [`register`](Self::register)
    pub fn with_disabled<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Register a tool. Returns false when it is disabled by configuration or
    /// the name is already taken.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> bool {
        let name = tool.name().to_string();

        if self.disabled.contains(&name) {
            tracing::info!(
                tool = %name,
                "Tool disabled by {}",
                disable_env_var(&name)
            );
            return false;
        }
        if self.tools.contains_key(&name) {
            tracing::warn!(tool = %name, "Duplicate tool name, keeping the first registration");
            return false;
        }

        self.schemas.push(AiTool {
            name: name.clone(),
            description: tool.description().to_string(),
            parameters: tool.parameters_schema(),
        });
        self.tools.insert(name, tool);
        true
    }

    /// Add a post-execution hook
    pub fn add_post_hook(&mut self, hook: Arc<dyn PostToolHook>) {
        self.post_hooks.push(hook);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Enabled tool schemas. Fixed after startup.
    pub fn list_tools(&self) -> &[AiTool] {
        &self.schemas
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Execute a tool by name with hooks and timeout
    pub async fn invoke(&self, name: &str, params: Value, ctx: &ToolContext) -> ToolResult {
        let start = Instant::now();

        let result = match self.get(name) {
            None => {
                tracing::warn!(tool = name, "Unknown tool requested");
                ToolResult::error(format!("Error: unknown tool '{}'", name))
            }
            Some(tool) => {
                let timeout = ctx.timeout.unwrap_or(self.default_timeout);
                let execution = AssertUnwindSafe(tool.execute(params.clone(), ctx)).catch_unwind();
                match tokio::time::timeout(timeout, execution).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(_)) => {
                        tracing::error!(tool = name, "Tool execution panicked");
                        ToolResult::error(format!("Error: tool '{}' panicked", name))
                    }
                    Err(_) => {
                        tracing::warn!(
                            tool = name,
                            timeout_secs = timeout.as_secs(),
                            "Tool execution timed out"
                        );
                        ToolResult::error(format!(
                            "Error: tool '{}' timed out after {} seconds",
                            name,
                            timeout.as_secs()
                        ))
                    }
                }
            }
        };

        let duration = start.elapsed();
        for hook in &self.post_hooks {
            hook.after_execute(name, &params, &result, duration).await;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the given text"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}, "required": ["text"]})
        }

        async fn execute(&self, params: Value, _ctx: &ToolContext) -> ToolResult {
            #[derive(serde::Deserialize)]
            struct Params {
                text: String,
            }
            match parse_params::<Params>(params) {
                Ok(p) => ToolResult::success(p.text),
                Err(e) => e,
            }
        }
    }

    struct SleepyTool;

    #[async_trait]
    impl Tool for SleepyTool {
        fn name(&self) -> &str {
            "sleepy"
        }

        fn description(&self) -> &str {
            "Never finishes in time"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn execute(&self, _params: Value, _ctx: &ToolContext) -> ToolResult {
            tokio::time::sleep(Duration::from_secs(60)).await;
            ToolResult::success("late")
        }
    }

    struct PanickyTool;

    #[async_trait]
    impl Tool for PanickyTool {
        fn name(&self) -> &str {
            "boom"
        }

        fn description(&self) -> &str {
            "Panics on every call"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn execute(&self, _params: Value, _ctx: &ToolContext) -> ToolResult {
            panic!("tool blew up");
        }
    }

    #[derive(Default)]
    struct RecordingHook {
        calls: Mutex<Vec<(String, bool)>>,
    }

    #[async_trait]
    impl PostToolHook for RecordingHook {
        async fn after_execute(
            &self,
            name: &str,
            _params: &Value,
            result: &ToolResult,
            _duration: Duration,
        ) {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), result.is_error));
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_returns_error_result() {
        let registry = ToolRegistry::new();
        let result = registry
            .invoke("nonexistent_tool", json!({}), &ToolContext::default())
            .await;

        assert!(result.is_error);
        assert!(result.output.contains("unknown tool"));
    }

    #[tokio::test]
    async fn test_invoke_dispatches_by_name() {
        let mut registry = ToolRegistry::new();
        assert!(registry.register(Arc::new(EchoTool)));

        let result = registry
            .invoke("echo", json!({"text": "hi"}), &ToolContext::default())
            .await;
        assert_eq!(result, ToolResult::success("hi"));
    }

    #[tokio::test]
    async fn test_invalid_params_are_error_results() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let result = registry
            .invoke("echo", json!({"text": 5}), &ToolContext::default())
            .await;
        assert!(result.is_error);
        assert!(result.output.starts_with("Invalid parameters"));
    }

    #[tokio::test]
    async fn test_disabled_tools_are_never_listed() {
        let mut registry = ToolRegistry::new().with_disabled(["echo"]);
        assert!(!registry.register(Arc::new(EchoTool)));
        assert!(registry.is_empty());
        assert!(registry.list_tools().is_empty());

        let result = registry
            .invoke("echo", json!({"text": "hi"}), &ToolContext::default())
            .await;
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn test_list_tools_is_stable() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry.register(Arc::new(SleepyTool));
        assert!(!registry.register(Arc::new(EchoTool)));

        let first = registry.list_tools().to_vec();
        let second = registry.list_tools().to_vec();
        assert_eq!(first, second);
        let names: Vec<_> = first.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["echo", "sleepy"]);
    }

    #[tokio::test]
    async fn test_timeout_becomes_error_result() {
        let mut registry = ToolRegistry::new().with_default_timeout(Duration::from_millis(20));
        registry.register(Arc::new(SleepyTool));

        let result = registry.invoke("sleepy", json!({}), &ToolContext::default()).await;
        assert!(result.is_error);
        assert!(result.output.contains("timed out"));

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(SleepyTool));
        let ctx = ToolContext::default().with_timeout(Duration::from_millis(20));
        let result = registry.invoke("sleepy", json!({}), &ctx).await;
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn test_panicking_tool_becomes_error_result() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(PanickyTool));
        registry.register(Arc::new(EchoTool));

        let ctx = ToolContext::default();
        let result = registry.invoke("boom", json!({}), &ctx).await;
        assert_eq!(result, ToolResult::error("Error: tool 'boom' panicked"));

        let after = registry.invoke("echo", json!({"text": "still here"}), &ctx).await;
        assert_eq!(after, ToolResult::success("still here"));
    }

    #[tokio::test]
    async fn test_post_hooks_see_every_invocation() {
        let hook = Arc::new(RecordingHook::default());
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry.add_post_hook(hook.clone());

        let ctx = ToolContext::default();
        registry.invoke("echo", json!({"text": "a"}), &ctx).await;
        registry.invoke("missing", json!({}), &ctx).await;

        let calls = hook.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![("echo".to_string(), false), ("missing".to_string(), true)]
        );
    }

    #[test]
    fn test_disable_env_var_name() {
        assert_eq!(disable_env_var("brave_search"), "TOOL_DISABLE_BRAVE_SEARCH");
    }
}

//! Shared constants

pub mod ai {
    use std::time::Duration;

    /// System prompt seeded at the head of every conversation.
    pub const SYSTEM_PROMPT: &str =
        "You are a helpful assistant with access to tools. Use them when needed.";

    /// Default cap on provider round trips that end in tool calls.
    pub const DEFAULT_MAX_ITERATIONS: usize = 5;

    /// Longest silence tolerated between two raw chunks of a provider stream.
    pub const STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(120);
}

pub mod tools {
    use std::time::Duration;

    /// Ceiling on text returned by fetch/read tools.
    pub const MAX_TOOL_TEXT_CHARS: usize = 10_000;

    /// Per-invocation timeout applied by the registry.
    pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(120);

    /// Display ceiling for tool results forwarded to a remote client.
    pub const DISPLAY_RESULT_CHARS: usize = 1_500;
}

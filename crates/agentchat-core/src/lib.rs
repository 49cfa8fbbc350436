//! agentchat core
//!
//! Streams chat completions from an OpenAI-compatible provider while letting the
//! model call tools mid-conversation. The server crate is a thin presentation
//! layer over [`agent::AgenticOrchestrator`].

pub mod agent;
pub mod ai;
pub mod config;
pub mod constants;
pub mod tools;

pub use agent::{AgenticOrchestrator, Conversation, LoopEvent, RunOutcome};
pub use config::AppConfig;

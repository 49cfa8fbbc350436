//! Agent loop
//!
//! ## Orchestrator (the canonical agentic loop)
//! - `AgenticOrchestrator` - Streaming, tool rounds, iteration cap, cancellation
//! - `LoopEvent` - Event protocol between orchestrator and consumers
//! - `OrchestratorConfig` / `OrchestratorServices` - Configuration and dependencies
//!
//! ## State
//! - `Conversation` - Append-only message log for one request
//!
//! ## Hooks
//! - `LoggingHook` - Logs all tool executions

pub mod conversation;
mod executor;
pub mod hooks;
pub mod loop_events;
pub mod orchestrator;
mod stream;

pub use conversation::Conversation;
pub use hooks::{LoggingHook, PostToolHook};
pub use loop_events::LoopEvent;
pub use orchestrator::{AgenticOrchestrator, OrchestratorConfig, OrchestratorServices, RunOutcome};

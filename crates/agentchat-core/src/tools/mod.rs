//! Tool registry and built-in tool implementations

pub mod implementations;
pub mod path_utils;
pub mod registry;
pub mod truncation;

pub use implementations::register_builtin_tools;
pub use registry::{parse_params, Tool, ToolContext, ToolRegistry, ToolResult};

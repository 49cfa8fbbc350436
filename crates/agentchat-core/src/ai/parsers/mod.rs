//! SSE payload parsers

mod openai;

pub use openai::OpenAIParser;

//! Request body formatting

pub mod openai;

pub use openai::OpenAIFormat;

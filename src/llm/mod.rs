pub mod client;
pub mod types;

pub use client::{ClaudeClient, OllamaClient};
pub use types::{Completion, LlmError};

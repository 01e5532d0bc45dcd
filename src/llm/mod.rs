// LLM abstraction layer

pub mod provider;
pub mod ollama;
pub mod openai_compat;

pub use provider::*;

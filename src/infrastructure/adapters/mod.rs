//! Adapters - 外部服务适配器

pub mod llm;

pub use llm::{FakeLlmClient, FakeLlmClientConfig, HttpLlmClient, HttpLlmClientConfig};

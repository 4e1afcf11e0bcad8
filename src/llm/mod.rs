//! LLM 层：客户端抽象与实现（Ollama / OpenAI 兼容 / Mock）

pub mod mock;
pub mod ollama;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use crate::config::AppConfig;

pub use mock::MockLlmClient;
pub use ollama::{create_ollama_client, OLLAMA_BASE_URL, OLLAMA_DEFAULT_MODEL};
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::LlmClient;

/// 根据配置选择 LLM 后端（ollama / openai / mock）
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    match cfg.llm.provider.to_lowercase().as_str() {
        "mock" => {
            tracing::warn!("Using Mock LLM (no real model)");
            Arc::new(MockLlmClient::default())
        }
        "openai" => {
            tracing::info!("Using OpenAI-compatible LLM ({})", cfg.llm.model);
            Arc::new(OpenAiClient::new(
                cfg.llm.base_url.as_deref(),
                &cfg.llm.model,
                std::env::var("OPENAI_API_KEY").ok().as_deref(),
                cfg.llm.temperature,
            ))
        }
        _ => {
            tracing::info!("Using Ollama LLM ({})", cfg.llm.model);
            Arc::new(create_ollama_client(
                Some(&cfg.llm.model),
                cfg.llm.base_url.as_deref(),
                cfg.llm.temperature,
            ))
        }
    }
}

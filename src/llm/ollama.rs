//! Ollama 本地端点客户端（OpenAI 兼容格式）
//!
//! Ollama 自带 OpenAI 兼容接口（/v1），无需真实 API Key。
//! - Base URL: http://localhost:11434/v1
//! - 模型: 任意已 pull 的本地模型（默认 llama3）

use crate::llm::OpenAiClient;

/// Ollama 默认端点与模型
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3";

/// 创建 Ollama 客户端
///
/// - 端点：`base_url` 参数 > 环境变量 `OLLAMA_HOST`（自动补 /v1）> 默认本地端点
/// - 模型：`model` 参数 > 环境变量 `OLLAMA_MODEL` > llama3
/// - API Key 填占位符（Ollama 不校验）
pub fn create_ollama_client(
    model: Option<&str>,
    base_url: Option<&str>,
    temperature: f32,
) -> OpenAiClient {
    let base = base_url
        .map(String::from)
        .or_else(|| {
            std::env::var("OLLAMA_HOST")
                .ok()
                .map(|h| format!("{}/v1", h.trim_end_matches('/')))
        })
        .unwrap_or_else(|| OLLAMA_BASE_URL.to_string());

    let model = model
        .map(String::from)
        .or_else(|| std::env::var("OLLAMA_MODEL").ok())
        .unwrap_or_else(|| OLLAMA_DEFAULT_MODEL.to_string());

    OpenAiClient::new(Some(&base), &model, Some("ollama"), temperature)
}

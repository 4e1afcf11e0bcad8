//! Mock LLM 客户端（用于测试，无需本地模型）
//!
//! 默认回显最后一条 User 消息；with_reply 可指定固定回复（如含 R 代码块的文本），
//! failing 模拟调用失败，便于测试 turn 边界的错误吸收。

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::stream;

use crate::llm::LlmClient;
use crate::memory::Message;

/// Mock 客户端：固定回复 / 固定失败 / 回显
#[derive(Debug, Default)]
pub struct MockLlmClient {
    reply: Option<String>,
    error: Option<String>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 固定返回给定文本
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            error: None,
        }
    }

    /// 每次调用都失败（模拟协作方不可用）
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: None,
            error: Some(message.into()),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if let Some(reply) = &self.reply {
            return Ok(reply.clone());
        }
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, crate::memory::Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");
        Ok(format!("Echo from Mock: {}", last_user))
    }

    async fn complete_stream(
        &self,
        messages: &[Message],
    ) -> Result<Pin<Box<dyn futures_util::Stream<Item = Result<String, String>> + Send>>, String>
    {
        // 按小块切分，让调用方真正走「耗尽流再提取」的路径
        let content = self.complete(messages).await?;
        let chunks: Vec<Result<String, String>> = content
            .chars()
            .collect::<Vec<_>>()
            .chunks(8)
            .map(|c| Ok(c.iter().collect()))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}

//! 会话编排
//!
//! 单轮状态流：技能选择 → Prompt 组装 → LLM 调用 → 历史更新 → 代码提取 →
//! (逐块执行 → 产物收集)* → TurnResult。LLM 失败在 turn 边界被吸收为回复文本；
//! 单个代码块失败不影响后续块；历史先于代码提取更新（历史反映模型说了什么，
//! 而不管其代码是否跑成）。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use futures_util::StreamExt;

use crate::config::AppConfig;
use crate::error::AgentError;
use crate::exec::{ArtifactCollector, CodeBlockExtractor, ExecutionResult, ExecutionSandbox};
use crate::llm::LlmClient;
use crate::memory::{ConversationMemory, Message};
use crate::skills::{load_persona, PromptComposer, RelevanceSelector, SkillRegistry};

/// 单轮结果：回复文本、用到的技能、代码执行情况与产物
#[derive(Debug, Clone, Default)]
pub struct TurnResult {
    pub response: String,
    pub skills_used: Vec<String>,
    /// 至少一个代码块成功执行时为 true
    pub code_executed: bool,
    /// 全部成功块的产物累计（顺序 = 块执行顺序）
    pub artifacts: Vec<PathBuf>,
    /// 失败块的错误累计（换行分隔）
    pub execution_error: Option<String>,
}

/// 会话：持有注册表、选择器、组装器、执行管线与对话历史，单线程逐轮驱动
pub struct AgentSession {
    llm: Arc<dyn LlmClient>,
    registry: SkillRegistry,
    selector: RelevanceSelector,
    composer: PromptComposer,
    extractor: CodeBlockExtractor,
    sandbox: ExecutionSandbox,
    collector: ArtifactCollector,
    history: ConversationMemory,
    plots_dir: PathBuf,
    auto_execute: bool,
}

impl AgentSession {
    /// 从配置构建会话：发现技能、准备图表目录、装配执行管线
    pub fn new(cfg: &AppConfig, llm: Arc<dyn LlmClient>) -> Self {
        let registry = SkillRegistry::discover(&cfg.app.skills_dir);
        let plots_dir = cfg.app.plots_dir.clone();
        if let Err(e) = std::fs::create_dir_all(&plots_dir) {
            tracing::warn!(dir = %plots_dir.display(), "Cannot create plots directory: {}", e);
        }

        Self {
            llm,
            registry,
            selector: RelevanceSelector::new(cfg.app.max_skills),
            composer: PromptComposer::new(load_persona()),
            extractor: CodeBlockExtractor::new(&cfg.exec.language_tag),
            sandbox: ExecutionSandbox::new(&cfg.exec.interpreter, cfg.exec.timeout_secs),
            collector: ArtifactCollector::new(
                &cfg.exec.artifact_extensions,
                cfg.exec.mtime_slack_secs,
            ),
            history: ConversationMemory::new(cfg.app.max_context_turns),
            plots_dir,
            auto_execute: cfg.exec.auto_execute,
        }
    }

    /// 非流式单轮
    pub async fn chat(&mut self, user_msg: &str) -> TurnResult {
        self.run_turn(user_msg, None).await
    }

    /// 流式单轮：on_chunk 随片段到达被调用；流被完整耗尽后才进入代码提取
    pub async fn chat_stream<F>(&mut self, user_msg: &str, mut on_chunk: F) -> TurnResult
    where
        F: FnMut(&str),
    {
        self.run_turn(user_msg, Some(&mut on_chunk)).await
    }

    async fn run_turn(
        &mut self,
        user_msg: &str,
        on_chunk: Option<&mut dyn FnMut(&str)>,
    ) -> TurnResult {
        // 1. 技能选择与 Prompt 组装
        let selected = self.selector.select(user_msg, &self.registry);
        let skills_used: Vec<String> = selected.iter().map(|s| s.name.clone()).collect();
        if !skills_used.is_empty() {
            tracing::info!(skills = ?skills_used, "Using skills");
        }
        let system = self.composer.compose(&selected);

        // 2. 组装消息并调用协作方
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(Message::system(system));
        messages.extend_from_slice(self.history.messages());
        messages.push(Message::user(user_msg));

        let response = match on_chunk {
            Some(cb) => self.drain_stream(&messages, cb).await,
            None => self.llm.complete(&messages).await,
        }
        .map_err(AgentError::Llm);

        let assistant = match response {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Chat collaborator failed: {}", e);
                // 失败也记录已发送的用户消息；失败描述作为回复文本返回
                self.history.push(Message::user(user_msg));
                return TurnResult {
                    response: e.to_string(),
                    ..TurnResult::default()
                };
            }
        };

        // 3. 历史更新先于代码提取
        self.history.push(Message::user(user_msg));
        self.history.push(Message::assistant(assistant.clone()));

        let mut result = TurnResult {
            response: assistant.clone(),
            skills_used,
            ..TurnResult::default()
        };

        // 4. 代码提取与逐块执行
        let blocks = self.extractor.extract(&assistant);
        if blocks.is_empty() || !self.auto_execute {
            return result;
        }
        tracing::info!(count = blocks.len(), "Code block(s) detected, executing");

        let mut errors = Vec::new();
        for (i, code) in blocks.iter().enumerate() {
            let exec = self.execute_block(code).await;
            if exec.success {
                tracing::info!(block = i + 1, artifacts = exec.artifacts.len(), "Block executed");
                result.code_executed = true;
                result.artifacts.extend(exec.artifacts);
            } else {
                let err = exec
                    .error
                    .unwrap_or_else(|| "unknown execution error".to_string());
                tracing::error!(block = i + 1, "Block failed: {}", err);
                errors.push(err);
            }
        }
        if !errors.is_empty() {
            result.execution_error = Some(errors.join("\n"));
        }
        result
    }

    /// 执行单个代码块；成功后收集产物填入结果（失败运行的产物不可信，恒为空）
    async fn execute_block(&self, code: &str) -> ExecutionResult {
        let mut exec = self.sandbox.run(code, &self.plots_dir).await;
        if exec.success {
            let script_mtime = std::fs::metadata(self.sandbox.script_path(&self.plots_dir))
                .and_then(|m| m.modified())
                .unwrap_or_else(|_| SystemTime::now());
            exec.artifacts = self.collector.collect(&self.plots_dir, script_mtime);
        }
        exec
    }

    /// 耗尽流式响应并拼接全文；任何片段出错都按协作方失败处理
    async fn drain_stream(
        &self,
        messages: &[Message],
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<String, String> {
        let mut stream = self.llm.complete_stream(messages).await?;
        let mut full = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            on_chunk(&chunk);
            full.push_str(&chunk);
        }
        Ok(full)
    }

    /// 清空对话历史
    pub fn reset(&mut self) {
        self.history.clear();
        tracing::info!("Conversation reset");
    }

    /// 技能清单（发现顺序）
    pub fn skills_summary(&self) -> String {
        self.registry.summary()
    }

    /// 切换自动执行开关，返回新状态
    pub fn toggle_auto_execute(&mut self) -> bool {
        self.auto_execute = !self.auto_execute;
        self.auto_execute
    }

    pub fn plots_dir(&self) -> &PathBuf {
        &self.plots_dir
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// 累计 token 使用统计
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.llm.token_usage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use tempfile::TempDir;

    fn test_config(tmp: &TempDir) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.app.skills_dir = tmp.path().join("skills");
        cfg.app.plots_dir = tmp.path().join("plots");
        // 测试用 sh 当解释器，脚本即 shell 代码
        cfg.exec.interpreter = "sh".to_string();
        cfg.exec.language_tag = "r".to_string();
        cfg.exec.timeout_secs = 10;
        cfg
    }

    #[tokio::test]
    async fn test_turn_without_code() {
        let tmp = TempDir::new().unwrap();
        let cfg = test_config(&tmp);
        let llm = Arc::new(MockLlmClient::with_reply("Just a plain answer."));
        let mut session = AgentSession::new(&cfg, llm);

        let result = session.chat("hello").await;
        assert_eq!(result.response, "Just a plain answer.");
        assert!(!result.code_executed);
        assert!(result.artifacts.is_empty());
        assert!(result.execution_error.is_none());
        // user + assistant
        assert_eq!(session.history_len(), 2);
    }

    #[tokio::test]
    async fn test_turn_with_successful_block_collects_artifact() {
        let tmp = TempDir::new().unwrap();
        let cfg = test_config(&tmp);
        let reply = "Here you go:\n```r\ntouch plot.png\n```\nDone.";
        let llm = Arc::new(MockLlmClient::with_reply(reply));
        let mut session = AgentSession::new(&cfg, llm);

        let result = session.chat("plot something").await;
        assert!(result.code_executed);
        assert!(result.execution_error.is_none());
        assert_eq!(result.artifacts.len(), 1);
        assert!(result.artifacts[0].ends_with("plot.png"));
    }

    #[tokio::test]
    async fn test_turn_with_failing_block() {
        let tmp = TempDir::new().unwrap();
        let cfg = test_config(&tmp);
        let reply = "```r\necho boom >&2\nexit 1\n```";
        let llm = Arc::new(MockLlmClient::with_reply(reply));
        let mut session = AgentSession::new(&cfg, llm);

        let result = session.chat("try this").await;
        assert!(!result.code_executed);
        assert!(result.artifacts.is_empty());
        assert!(result.execution_error.unwrap().contains("boom"));
        // 历史仍反映模型说了什么
        assert_eq!(session.history_len(), 2);
    }

    #[tokio::test]
    async fn test_failing_block_does_not_abort_next() {
        let tmp = TempDir::new().unwrap();
        let cfg = test_config(&tmp);
        let reply = "```r\nexit 1\n```\n```r\ntouch ok.svg\n```";
        let llm = Arc::new(MockLlmClient::with_reply(reply));
        let mut session = AgentSession::new(&cfg, llm);

        let result = session.chat("two blocks").await;
        // 第二块成功：code_executed 为 true，同时保留第一块的错误
        assert!(result.code_executed);
        assert!(result.execution_error.is_some());
        assert_eq!(result.artifacts.len(), 1);
    }

    #[tokio::test]
    async fn test_collaborator_failure_absorbed() {
        let tmp = TempDir::new().unwrap();
        let cfg = test_config(&tmp);
        let llm = Arc::new(MockLlmClient::failing("connection refused"));
        let mut session = AgentSession::new(&cfg, llm);

        let result = session.chat("hello").await;
        assert!(result.response.contains("connection refused"));
        assert!(!result.code_executed);
        assert!(result.skills_used.is_empty());
        // 已发送的用户消息仍被记录
        assert_eq!(session.history_len(), 1);
    }

    #[tokio::test]
    async fn test_auto_execute_toggle() {
        let tmp = TempDir::new().unwrap();
        let cfg = test_config(&tmp);
        let reply = "```r\ntouch skipped.png\n```";
        let llm = Arc::new(MockLlmClient::with_reply(reply));
        let mut session = AgentSession::new(&cfg, llm);

        assert!(!session.toggle_auto_execute());
        let result = session.chat("plot").await;
        assert!(!result.code_executed);
        assert!(result.artifacts.is_empty());
    }

    #[tokio::test]
    async fn test_stream_turn_drained_before_extraction() {
        let tmp = TempDir::new().unwrap();
        let cfg = test_config(&tmp);
        let reply = "Plotting now:\n```r\ntouch stream.png\n```";
        let llm = Arc::new(MockLlmClient::with_reply(reply));
        let mut session = AgentSession::new(&cfg, llm);

        let mut streamed = String::new();
        let result = session
            .chat_stream("plot", |chunk| streamed.push_str(chunk))
            .await;
        assert_eq!(streamed, reply);
        assert_eq!(result.response, reply);
        assert!(result.code_executed);
        assert_eq!(result.artifacts.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_clears_history() {
        let tmp = TempDir::new().unwrap();
        let cfg = test_config(&tmp);
        let llm = Arc::new(MockLlmClient::new());
        let mut session = AgentSession::new(&cfg, llm);

        session.chat("one").await;
        assert!(session.history_len() > 0);
        session.reset();
        assert_eq!(session.history_len(), 0);
    }
}

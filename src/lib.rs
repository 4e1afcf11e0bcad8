//! Magpie - Rust 本地大模型技能助手
//!
//! 模块划分：
//! - **agent**: 会话编排（技能选择 → Prompt 组装 → LLM 调用 → R 代码执行 → 产物收集）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **error**: 错误类型（turn 边界以下的失败全部吸收，不向调用方抛出）
//! - **exec**: R 代码块提取、沙箱执行与图表产物收集
//! - **llm**: LLM 客户端抽象与实现（Ollama / OpenAI 兼容 / Mock）
//! - **memory**: 对话历史（append-only，可选窗口裁剪）
//! - **skills**: 技能系统（SKILL.md 发现、解析、相关性选择、Prompt 注入）
//! - **ui**: 交互式 REPL 与跨平台图片查看

pub mod agent;
pub mod config;
pub mod error;
pub mod exec;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod skills;
pub mod ui;

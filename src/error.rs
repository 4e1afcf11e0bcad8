//! 错误类型
//!
//! turn 边界以下的失败（LLM 调用、清单解析、脚本执行）全部被吸收为描述性文本，
//! 进入 TurnResult 或 ExecutionResult，绝不让单轮失败终止进程。

use thiserror::Error;

/// 会话运行过程中可能出现的错误
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(String),

    /// 单个技能清单解析失败：记录日志并跳过该技能，注册表构建继续
    #[error("Manifest parse error: {0}")]
    ManifestParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//! Magpie 入口：初始化日志、加载配置、构建会话并运行 REPL。

use anyhow::Context;
use magpie::agent::AgentSession;
use magpie::config::{load_config, AppConfig};
use magpie::llm::create_llm_from_config;
use magpie::ui::run_repl;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    magpie::observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let llm = create_llm_from_config(&cfg);
    let auto_display = cfg.exec.auto_display;
    let mut session = AgentSession::new(&cfg, llm);

    run_repl(&mut session, auto_display)
        .await
        .context("REPL failed")?;

    Ok(())
}

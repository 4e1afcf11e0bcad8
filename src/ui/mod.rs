//! 交互式 REPL
//!
//! 行式命令循环：/reset /skills /plots /toggle /quit，其余输入作为对话轮次（流式打印）。
//! 轮内失败只打印，不中断循环。

pub mod viewer;

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::agent::AgentSession;

pub use viewer::open_artifact;

/// 打印欢迎信息与命令列表
fn print_banner(session: &AgentSession) {
    println!("{}", "=".repeat(60));
    println!("Magpie - skills-augmented local LLM agent");
    println!("{}", "=".repeat(60));
    println!();
    println!("Commands:");
    println!("  /reset    - Clear conversation");
    println!("  /skills   - List skills");
    println!("  /plots    - Show plots directory");
    println!("  /toggle   - Toggle auto-execution on/off");
    println!("  /quit     - Exit");
    println!();
    println!("Plots will be saved to: {}", session.plots_dir().display());
    println!("{}", "=".repeat(60));
}

/// 列出图表目录内容（最多 10 个）
fn print_plots_dir(session: &AgentSession) {
    let dir = session.plots_dir();
    println!("Plots directory: {}", dir.display());
    let Ok(entries) = std::fs::read_dir(dir) else {
        println!("  (unreadable)");
        return;
    };
    let names: Vec<String> = entries
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    if names.is_empty() {
        println!("  (empty)");
        return;
    }
    println!("  Contains {} file(s):", names.len());
    for name in names.iter().take(10) {
        println!("  - {}", name);
    }
}

/// 主循环：读取 stdin，分发命令或跑对话轮次
pub async fn run_repl(session: &mut AgentSession, auto_display: bool) -> anyhow::Result<()> {
    print_banner(session);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("\nYou: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" => {
                let (prompt, completion, total) = session.token_usage();
                if total > 0 {
                    println!("Token usage: {} prompt + {} completion = {}", prompt, completion, total);
                }
                println!("Goodbye!");
                break;
            }
            "/reset" => {
                session.reset();
                println!("Conversation reset");
                continue;
            }
            "/skills" => {
                println!("{}", session.skills_summary());
                continue;
            }
            "/plots" => {
                print_plots_dir(session);
                continue;
            }
            "/toggle" => {
                let on = session.toggle_auto_execute();
                println!("Auto-execute R: {}", on);
                continue;
            }
            _ => {}
        }

        print!("Assistant: ");
        std::io::stdout().flush()?;
        let result = session
            .chat_stream(input, |chunk| {
                print!("{}", chunk);
                let _ = std::io::stdout().flush();
            })
            .await;
        println!();

        if !result.skills_used.is_empty() {
            println!("Skills used: {}", result.skills_used.join(", "));
        }
        if let Some(err) = &result.execution_error {
            println!("R execution failed:\n{}", err);
        }
        if result.code_executed && !result.artifacts.is_empty() {
            println!("Generated {} plot(s)", result.artifacts.len());
            for path in &result.artifacts {
                println!("Plot saved: {}", path.display());
                if auto_display {
                    viewer::open_artifact(path);
                }
            }
        }
    }

    Ok(())
}

//! 执行沙箱
//!
//! 代码原样写入工作目录下的固定名脚本文件，以解释器子进程执行（cwd = 工作目录，
//! 脚本写的相对路径产物落点可知），stdout / stderr 分开捕获，带硬超时。
//! 脚本文件执行后保留（便于事后排查）；工作目录跨轮共享，调用方不得假设其干净。

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::process::Command;

/// 固定脚本文件名
pub const SCRIPT_FILE_NAME: &str = "temp_script.R";

/// 单次脚本执行结果
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    /// 失败时 stderr 与 stdout 合并（Rscript 的启动诊断有时落在 stdout，失败路径两个流都不能丢）
    pub error: Option<String>,
    /// 仅零退出的运行可信任产物；失败时恒为空
    pub artifacts: Vec<PathBuf>,
}

impl ExecutionResult {
    fn failure(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            error: Some(msg.into()),
            artifacts: Vec::new(),
        }
    }
}

/// 执行沙箱：解释器名（经 PATH 查找）+ 超时
pub struct ExecutionSandbox {
    interpreter: String,
    timeout: Duration,
}

impl ExecutionSandbox {
    pub fn new(interpreter: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// 脚本文件在工作目录中的路径
    pub fn script_path(&self, workdir: &Path) -> PathBuf {
        workdir.join(SCRIPT_FILE_NAME)
    }

    /// 执行一个代码块；所有失败都转为 success=false 的结果，不向上抛出
    pub async fn run(&self, code: &str, workdir: &Path) -> ExecutionResult {
        if let Err(e) = tokio::fs::create_dir_all(workdir).await {
            return ExecutionResult::failure(format!("Cannot create working directory: {}", e));
        }
        let script = self.script_path(workdir);
        if let Err(e) = tokio::fs::write(&script, code).await {
            return ExecutionResult::failure(format!("Cannot write script file: {}", e));
        }

        tracing::info!(script = %script.display(), interpreter = %self.interpreter, "Executing code block");

        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(SCRIPT_FILE_NAME)
            .current_dir(workdir)
            .kill_on_drop(true);

        let start = Instant::now();
        let result = tokio::time::timeout(self.timeout, cmd.output()).await;

        let outcome = match &result {
            Ok(Ok(o)) if o.status.success() => "ok",
            Ok(Ok(_)) => "error",
            Ok(Err(_)) => "launch_failed",
            Err(_) => "timeout",
        };
        let audit = serde_json::json!({
            "event": "exec_audit",
            "interpreter": self.interpreter,
            "outcome": outcome,
            "duration_ms": start.elapsed().as_millis() as u64,
        });
        tracing::info!(audit = %audit.to_string(), "exec");

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::error!("Interpreter '{}' not found", self.interpreter);
                return ExecutionResult::failure(format!(
                    "{} not found. Make sure R is installed and in PATH.",
                    self.interpreter
                ));
            }
            Ok(Err(e)) => {
                tracing::error!("Failed to launch interpreter: {}", e);
                return ExecutionResult::failure(format!("Execution failed: {}", e));
            }
            Err(_) => {
                tracing::error!("Script execution timed out");
                return ExecutionResult::failure(format!(
                    "R script execution timed out ({}s limit)",
                    self.timeout.as_secs()
                ));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::error!(code = ?output.status.code(), "Script exited with non-zero status");
            return ExecutionResult::failure(format!("{}{}", stderr, stdout));
        }

        ExecutionResult {
            success: true,
            stdout,
            error: None,
            artifacts: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // 测试用 sh 当解释器：sh 不在乎脚本扩展名，跑 shell 代码即可覆盖全部出口分类

    #[tokio::test]
    async fn test_zero_exit_captures_stdout() {
        let tmp = TempDir::new().unwrap();
        let sandbox = ExecutionSandbox::new("sh", 10);
        let result = sandbox.run("echo hello-from-script", tmp.path()).await;
        assert!(result.success);
        assert!(result.stdout.contains("hello-from-script"));
        assert!(result.error.is_none());
        assert!(result.artifacts.is_empty());
    }

    #[tokio::test]
    async fn test_nonzero_exit_combines_both_streams() {
        let tmp = TempDir::new().unwrap();
        let sandbox = ExecutionSandbox::new("sh", 10);
        let result = sandbox
            .run("echo on-stdout\necho on-stderr >&2\nexit 3", tmp.path())
            .await;
        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.contains("on-stdout"));
        assert!(error.contains("on-stderr"));
        assert!(result.artifacts.is_empty());
    }

    #[tokio::test]
    async fn test_interpreter_not_found() {
        let tmp = TempDir::new().unwrap();
        let sandbox = ExecutionSandbox::new("definitely-not-an-interpreter-xyz", 10);
        let result = sandbox.run("whatever", tmp.path()).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let tmp = TempDir::new().unwrap();
        let sandbox = ExecutionSandbox::new("sh", 1);
        let result = sandbox.run("sleep 5", tmp.path()).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("timed out (1s limit)"));
    }

    #[tokio::test]
    async fn test_script_file_retained() {
        let tmp = TempDir::new().unwrap();
        let sandbox = ExecutionSandbox::new("sh", 10);
        sandbox.run("true", tmp.path()).await;
        let script = sandbox.script_path(tmp.path());
        assert!(script.exists());
        assert_eq!(std::fs::read_to_string(script).unwrap(), "true");
    }

    #[tokio::test]
    async fn test_rerun_independent() {
        let tmp = TempDir::new().unwrap();
        let sandbox = ExecutionSandbox::new("sh", 10);
        let first = sandbox.run("echo run", tmp.path()).await;
        let second = sandbox.run("echo run", tmp.path()).await;
        assert!(first.success && second.success);
        assert_eq!(first.stdout, second.stdout);
    }
}

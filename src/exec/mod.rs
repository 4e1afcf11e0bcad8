//! R 代码执行管线
//!
//! 三步：从助手回复提取 ```r 围栏代码块 → 写入固定名脚本文件并以子进程执行（带硬超时）
//! → 零退出后按「扩展名 + 修改时间新近性」收集图表产物。

mod artifacts;
mod extractor;
mod sandbox;

pub use artifacts::ArtifactCollector;
pub use extractor::CodeBlockExtractor;
pub use sandbox::{ExecutionResult, ExecutionSandbox, SCRIPT_FILE_NAME};

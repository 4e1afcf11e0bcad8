//! 图表产物收集器
//!
//! 被执行的代码是任意的，输出文件名无法预知，新近性是唯一可靠信号：
//! 非递归扫描工作目录，收集扩展名在已知集合内、且修改时间晚于脚本写入时间
//! （留几秒余量容忍时间戳粗粒度）的常规文件。返回目录迭代顺序，仅用于展示，
//! 调用方不得依赖其跨平台确定性。

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// 产物收集器：已知扩展名（小写比较）+ 修改时间余量
pub struct ArtifactCollector {
    extensions: Vec<String>,
    slack: Duration,
}

impl ArtifactCollector {
    pub fn new(extensions: &[String], slack_secs: u64) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
            slack: Duration::from_secs(slack_secs),
        }
    }

    /// 收集修改时间晚于 script_mtime - slack 的已识别扩展名文件
    pub fn collect(&self, workdir: &Path, script_mtime: SystemTime) -> Vec<PathBuf> {
        let threshold = script_mtime
            .checked_sub(self.slack)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut found = Vec::new();
        let entries = match std::fs::read_dir(workdir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %workdir.display(), "Cannot scan for artifacts: {}", e);
                return found;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            let ext = ext.to_lowercase();
            if !self.extensions.iter().any(|known| *known == ext) {
                continue;
            }
            let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
            if matches!(modified, Some(mtime) if mtime > threshold) {
                found.push(path);
            }
        }
        found
    }
}

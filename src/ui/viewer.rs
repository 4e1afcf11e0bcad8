//! 跨平台图片查看
//!
//! macOS open / Windows cmd start / 其余 xdg-open。文件缺失或打开失败只降级为提示，
//! 绝不中断当前轮次。

use std::path::Path;
use std::process::Command;

/// 用系统默认查看器打开产物；返回是否成功发起
pub fn open_artifact(path: &Path) -> bool {
    if !path.exists() {
        println!("Plot file not found: {}", path.display());
        return false;
    }

    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(path).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", ""]).arg(path).spawn()
    } else {
        Command::new("xdg-open").arg(path).spawn()
    };

    match result {
        Ok(_) => true,
        Err(e) => {
            println!("Could not auto-open plot: {}", e);
            println!("You can open it manually: {}", path.display());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_degrades() {
        assert!(!open_artifact(Path::new("/no/such/plot.png")));
    }
}

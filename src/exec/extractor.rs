//! 代码块提取器
//!
//! 匹配开栏后紧跟语言标签与换行的围栏块（标签大小写不敏感，DOTALL 跨行捕获到下一个闭栏）。
//! 正文里嵌套的栏状序列不做特殊处理。无匹配返回空序列，从不报错。

use regex::Regex;

/// 按语言标签提取围栏代码块，出现顺序即执行顺序
#[derive(Debug, Clone)]
pub struct CodeBlockExtractor {
    pattern: Regex,
}

impl CodeBlockExtractor {
    pub fn new(language_tag: &str) -> Self {
        let pattern = Regex::new(&format!(
            r"(?is)```{}\n(.*?)```",
            regex::escape(language_tag)
        ))
        .unwrap();
        Self { pattern }
    }

    /// 返回全部匹配块的正文（源文本顺序）
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.pattern
            .captures_iter(text)
            .map(|cap| cap[1].to_string())
            .collect()
    }
}

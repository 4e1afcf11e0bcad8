//! 技能选择器
//!
//! 纯词法启发式：查询按空白分词、丢弃长度 ≤ 3 的常见短词，对每个技能的
//! name + description 做小写子串计分。刻意不做语义匹配（无 embedding、无同义词）——
//! 渐进式披露只需要一个够便宜的相关性信号。

use crate::skills::{SkillDocument, SkillRegistry};

/// 相关性选择器：返回计分排序后截断的技能子集
#[derive(Debug, Clone)]
pub struct RelevanceSelector {
    max_results: usize,
}

impl RelevanceSelector {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }

    /// 根据查询选出至多 max_results 个相关技能
    ///
    /// 计分：每个查询 token（不去重，同词出现两次就计两次）在技能文本中作为子串
    /// 出现则 +1；0 分技能被排除；按分数降序稳定排序，平分保持发现顺序。
    pub fn select<'a>(&self, query: &str, registry: &'a SkillRegistry) -> Vec<&'a SkillDocument> {
        let query_lower = query.to_lowercase();
        let tokens: Vec<&str> = query_lower
            .split_whitespace()
            .filter(|w| w.chars().count() > 3)
            .collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, &SkillDocument)> = Vec::new();
        for skill in registry.all() {
            let text = format!("{} {}", skill.name, skill.description).to_lowercase();
            let score = tokens.iter().filter(|t| text.contains(*t)).count();
            if score > 0 {
                scored.push((score, skill));
            }
        }

        // Vec::sort_by 是稳定排序，平分保持发现顺序
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(self.max_results)
            .map(|(_, skill)| skill)
            .collect()
    }
}

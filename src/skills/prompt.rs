//! System prompt 组装
//!
//! 基础人设 + 选中技能正文。技能按选择顺序（相关性降序）输出——顺序本身就是
//! 给模型的显著性信号。无选中技能时只输出人设加收尾。

use crate::skills::SkillDocument;

/// 默认人设（config/prompts/persona.txt 缺失时使用）
pub const DEFAULT_PERSONA: &str = "You are a helpful AI assistant";

/// Prompt 组装器
#[derive(Debug, Clone)]
pub struct PromptComposer {
    persona: String,
}

impl PromptComposer {
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
        }
    }

    /// 组装 system prompt；skills 为空时仅人设 + 收尾
    pub fn compose(&self, skills: &[&SkillDocument]) -> String {
        let mut prompt = self.persona.clone();

        if skills.is_empty() {
            prompt.push_str(".\n\n");
            return prompt;
        }

        prompt.push_str(" with access to specialized skills.\n\n");
        prompt.push_str("## Active Skills\n\n");
        for skill in skills {
            prompt.push_str(&format!("### {}\n\n", skill.name));
            prompt.push_str(&skill.body);
            prompt.push_str("\n\n---\n\n");
        }
        prompt
    }
}

/// 从 config/prompts/persona.txt 加载人设，不存在时用默认值
pub fn load_persona() -> String {
    ["config/prompts/persona.txt", "../config/prompts/persona.txt"]
        .into_iter()
        .find_map(|p| std::fs::read_to_string(p).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| DEFAULT_PERSONA.to_string())
}

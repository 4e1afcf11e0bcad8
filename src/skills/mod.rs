//! 技能系统
//!
//! 技能（Skill）是一个目录：必需的 SKILL.md 清单（可选 `---` 元数据块 + 指令正文）
//! 加上任意参考文件。助手按用户消息的相关性从技能库中选出少量技能注入 system prompt
//! （渐进式披露：无论注册了多少技能，prompt 体积有界）。
//!
//! 目录结构：
//! ```text
//! skills/
//! ├── sales-report/
//! │   ├── SKILL.md        # 清单：元数据 + 指令正文
//! │   └── template.csv    # 参考文件（不默认注入，按名取用）
//! └── ...
//! ```

mod document;
mod prompt;
mod registry;
mod selector;

pub use document::{SkillDocument, SkillMeta, MANIFEST_FILE};
pub use prompt::{load_persona, PromptComposer, DEFAULT_PERSONA};
pub use registry::SkillRegistry;
pub use selector::RelevanceSelector;

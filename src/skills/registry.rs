//! 技能注册表
//!
//! 从根目录的一级子目录发现技能；单个技能解析失败只记日志并跳过，发现本身永不失败。
//! 根目录不存在时自动创建并返回空注册表（「未配置技能」不是错误）。
//! 集合保持目录迭代顺序（即发现顺序），发现后只读。

use std::path::Path;

use crate::skills::{SkillDocument, MANIFEST_FILE};

/// 技能注册表：按发现顺序持有 SkillDocument
#[derive(Debug, Default)]
pub struct SkillRegistry {
    skills: Vec<SkillDocument>,
}

impl SkillRegistry {
    /// 发现根目录下的所有技能
    pub fn discover(root: &Path) -> Self {
        let mut skills = Vec::new();

        if !root.exists() {
            tracing::info!(path = %root.display(), "Skills directory missing, creating it");
            if let Err(e) = std::fs::create_dir_all(root) {
                tracing::warn!("Failed to create skills directory: {}", e);
            }
            return Self { skills };
        }

        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %root.display(), "Cannot read skills directory: {}", e);
                return Self { skills };
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() || !path.join(MANIFEST_FILE).exists() {
                continue;
            }
            match SkillDocument::load(&path) {
                Ok(doc) => {
                    tracing::info!(skill = %doc.name, "Loaded skill");
                    skills.push(doc);
                }
                Err(e) => {
                    tracing::warn!(dir = %path.display(), "Skipping skill: {}", e);
                }
            }
        }

        tracing::info!("Loaded {} skills", skills.len());
        Self { skills }
    }

    /// 按名查找：第一个大小写不敏感匹配
    pub fn lookup(&self, name: &str) -> Option<&SkillDocument> {
        let lower = name.to_lowercase();
        self.skills.iter().find(|s| s.name.to_lowercase() == lower)
    }

    /// 全部技能（发现顺序）
    pub fn all(&self) -> &[SkillDocument] {
        &self.skills
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// 人类可读的技能清单（发现顺序编号）
    pub fn summary(&self) -> String {
        if self.skills.is_empty() {
            return "No skills available.".to_string();
        }
        let mut out = String::from("Available Skills:\n\n");
        for (i, skill) in self.skills.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, skill.summary_line()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn add_skill(root: &Path, dir: &str, manifest: &str) {
        let path = root.join(dir);
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join(MANIFEST_FILE), manifest).unwrap();
    }

    #[test]
    fn test_discover_loads_valid_skills() {
        let tmp = TempDir::new().unwrap();
        add_skill(
            tmp.path(),
            "alpha",
            "---\nname: alpha\ndescription: first skill\n---\nbody a\n",
        );
        add_skill(tmp.path(), "beta", "body only\n");
        // 无清单的目录被忽略
        std::fs::create_dir_all(tmp.path().join("not-a-skill")).unwrap();

        let registry = SkillRegistry::discover(tmp.path());
        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("alpha").is_some());
        assert!(registry.lookup("beta").is_some());
    }

    #[test]
    fn test_malformed_manifest_skipped() {
        let tmp = TempDir::new().unwrap();
        add_skill(tmp.path(), "good", "---\nname: good\n---\nbody\n");
        add_skill(tmp.path(), "broken", "---\nname: broken\nunclosed\n");

        let registry = SkillRegistry::discover(tmp.path());
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("good").is_some());
        assert!(registry.lookup("broken").is_none());
    }

    #[test]
    fn test_missing_root_created_empty() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("no-such-dir");
        assert!(!root.exists());

        let registry = SkillRegistry::discover(&root);
        assert!(registry.is_empty());
        assert!(root.exists());
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        add_skill(tmp.path(), "report", "---\nname: Sales-Report\n---\nb\n");
        let registry = SkillRegistry::discover(tmp.path());
        assert!(registry.lookup("sales-report").is_some());
        assert!(registry.lookup("SALES-REPORT").is_some());
        assert!(registry.lookup("nope").is_none());
    }

    #[test]
    fn test_summary_lists_in_order() {
        let tmp = TempDir::new().unwrap();
        add_skill(tmp.path(), "one", "---\nname: one\ndescription: d1\n---\nb\n");
        let registry = SkillRegistry::discover(tmp.path());
        let summary = registry.summary();
        assert!(summary.contains("Available Skills"));
        assert!(summary.contains("**one**: d1"));

        let empty = SkillRegistry::default();
        assert_eq!(empty.summary(), "No skills available.");
    }
}

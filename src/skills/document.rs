//! SKILL.md 清单解析
//!
//! 清单 = 可选的 `---` 分隔元数据块（扁平 YAML 键值，识别 name / description，
//! 其余键忽略，向前兼容）+ 自由正文。无元数据块时整个文件为正文，name 回退为目录名。
//! 参考文件在加载时递归建立索引，内容按需读取；无法按 UTF-8 解码的文件给占位标记。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::AgentError;

/// 清单文件名（每个技能目录必须包含）
pub const MANIFEST_FILE: &str = "SKILL.md";

/// 清单元数据：显式结构体，解析时校验，不做动态字典
#[derive(Debug, Clone, Default)]
pub struct SkillMeta {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// 单个技能：元数据 + 正文 + 参考文件索引。注册表发现时构建一次，此后不可变。
#[derive(Debug, Clone)]
pub struct SkillDocument {
    pub name: String,
    pub description: String,
    /// 指令正文，按原样注入 prompt
    pub body: String,
    /// 相对路径 → 磁盘路径；索引在加载时建立，内容按需读取
    pub reference_files: BTreeMap<String, PathBuf>,
    pub dir: PathBuf,
}

impl SkillDocument {
    /// 从技能目录加载：读 SKILL.md、解析元数据与正文、索引参考文件
    pub fn load(dir: &Path) -> Result<Self, AgentError> {
        let manifest = dir.join(MANIFEST_FILE);
        let raw = std::fs::read_to_string(&manifest)?;
        let (meta, body) = parse_manifest(&raw)?;

        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let name = meta.name.unwrap_or(dir_name);
        let description = meta.description.unwrap_or_default();

        let mut reference_files = BTreeMap::new();
        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() || entry.path() == manifest {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(dir) {
                reference_files.insert(
                    rel.to_string_lossy().replace('\\', "/"),
                    entry.path().to_path_buf(),
                );
            }
        }

        Ok(Self {
            name,
            description,
            body,
            reference_files,
            dir: dir.to_path_buf(),
        })
    }

    /// 名称 + 描述的一行摘要（技能列表展示用）
    pub fn summary_line(&self) -> String {
        format!("**{}**: {}", self.name, self.description)
    }

    /// 按相对路径读取参考文件内容；二进制内容返回占位标记，未索引的路径返回 None
    pub fn read_reference(&self, rel_path: &str) -> Option<String> {
        let path = self.reference_files.get(rel_path)?;
        let bytes = std::fs::read(path).ok()?;
        match String::from_utf8(bytes) {
            Ok(text) => Some(text),
            Err(_) => Some(format!("[Binary file: {}]", rel_path)),
        }
    }
}

/// 拆分清单：首行为 `---` 时取到下一个 `---` 行之间的内容作为元数据块，其余为正文；
/// 无起始标记则整个文件为正文。起始标记存在但未闭合视为解析失败。
fn parse_manifest(raw: &str) -> Result<(SkillMeta, String), AgentError> {
    let mut lines = raw.lines();
    match lines.next() {
        Some(first) if first.trim() == "---" => {}
        _ => return Ok((SkillMeta::default(), raw.to_string())),
    }

    let mut meta_lines = Vec::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line.trim() == "---" {
            closed = true;
            break;
        }
        meta_lines.push(line);
    }
    if !closed {
        return Err(AgentError::ManifestParse(
            "metadata block not closed by ---".to_string(),
        ));
    }

    let body = lines.collect::<Vec<_>>().join("\n");
    Ok((parse_meta(&meta_lines), body))
}

/// 扁平键值解析：`key: value`，值可带引号；识别 name / description，其余忽略
fn parse_meta(lines: &[&str]) -> SkillMeta {
    let mut meta = SkillMeta::default();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let value = unquote(value.trim()).to_string();
        match key.trim() {
            "name" if !value.is_empty() => meta.name = Some(value),
            "description" => meta.description = Some(value),
            _ => {}
        }
    }
    meta
}

fn unquote(s: &str) -> &str {
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"'))
            || (s.starts_with('\'') && s.ends_with('\'')))
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

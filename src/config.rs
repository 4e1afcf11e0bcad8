//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `MAGPIE__*` 覆盖（双下划线表示嵌套，如 `MAGPIE__LLM__PROVIDER=openai`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub exec: ExecSection,
}

/// [app] 段：技能目录、图表目录、对话窗口
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
    /// 技能根目录，不存在时启动自动创建（空注册表，不是错误）
    pub skills_dir: PathBuf,
    /// 图表工作目录：脚本文件与所有产物都落在这里
    pub plots_dir: PathBuf,
    /// 对话历史保留轮数；0 表示不裁剪
    pub max_context_turns: usize,
    /// 单轮最多注入的技能数（渐进式披露，限制 prompt 体积）
    pub max_skills: usize,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            skills_dir: PathBuf::from("./skills"),
            plots_dir: PathBuf::from("./plots"),
            max_context_turns: 0,
            max_skills: 2,
        }
    }
}

/// [llm] 段：后端选择与采样参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：ollama / openai / mock
    pub provider: String,
    pub model: String,
    /// 覆盖默认端点（如自建代理、远程 Ollama）
    pub base_url: Option<String>,
    pub temperature: f32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llama3".to_string(),
            base_url: None,
            temperature: 0.7,
        }
    }
}

/// [exec] 段：R 代码执行与产物收集
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecSection {
    /// 是否自动执行回复中的 R 代码块
    pub auto_execute: bool,
    /// 是否自动用系统查看器打开生成的图表
    pub auto_display: bool,
    /// 围栏代码块语言标签（大小写不敏感）
    pub language_tag: String,
    /// 解释器程序名（经 PATH 查找；测试可替换为 sh）
    pub interpreter: String,
    /// 单次脚本执行超时（秒），超时不重试
    pub timeout_secs: u64,
    /// 识别为图表产物的扩展名
    pub artifact_extensions: Vec<String>,
    /// 产物修改时间判定的余量（秒），容忍时间戳粗粒度
    pub mtime_slack_secs: u64,
}

impl Default for ExecSection {
    fn default() -> Self {
        Self {
            auto_execute: true,
            auto_display: true,
            language_tag: "r".to_string(),
            interpreter: "Rscript".to_string(),
            timeout_secs: 60,
            artifact_extensions: vec![
                "png".into(),
                "pdf".into(),
                "jpg".into(),
                "jpeg".into(),
                "svg".into(),
            ],
            mtime_slack_secs: 5,
        }
    }
}

/// 从 config 目录加载配置，环境变量 MAGPIE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 MAGPIE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("MAGPIE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `TUTOR__*` 覆盖（双下划线表示嵌套，如 `TUTOR__LLM__PROVIDER=mock`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::LessonError;
use crate::lesson::FallbackLanguages;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub lesson: LessonSection,
}

/// [app] 段：进度与日志数据目录
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    /// progress.json 与 tutor.log 所在目录，未设置时用 ./data
    pub data_dir: Option<PathBuf>,
}

impl AppSection {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("data"))
    }
}

/// [llm] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：gemini / openai / deepseek / mock
    #[serde(default = "default_provider")]
    pub provider: String,
    /// 未设置时由各后端使用自己的默认模型
    pub model: Option<String>,
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: None,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    /// 单次请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    60
}

/// [lesson] 段：路由默认语言与每个槽位的 fallback 语言
#[derive(Debug, Clone, Deserialize)]
pub struct LessonSection {
    #[serde(default = "default_scratch_language")]
    pub scratch_language: String,
    #[serde(default = "default_left_language")]
    pub comparison_left: String,
    #[serde(default = "default_right_language")]
    pub comparison_right: String,
    #[serde(default)]
    pub fallback: FallbackSection,
}

impl Default for LessonSection {
    fn default() -> Self {
        Self {
            scratch_language: default_scratch_language(),
            comparison_left: default_left_language(),
            comparison_right: default_right_language(),
            fallback: FallbackSection::default(),
        }
    }
}

fn default_scratch_language() -> String {
    "javascript".to_string()
}

fn default_left_language() -> String {
    "javascript".to_string()
}

fn default_right_language() -> String {
    "python".to_string()
}

/// [lesson.fallback] 段：defaultCode 缺少当前语言时使用的 key
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackSection {
    #[serde(default = "default_scratch_language")]
    pub scratch: String,
    #[serde(default = "default_left_language")]
    pub left: String,
    #[serde(default = "default_right_language")]
    pub right: String,
}

impl Default for FallbackSection {
    fn default() -> Self {
        Self {
            scratch: default_scratch_language(),
            left: default_left_language(),
            right: default_right_language(),
        }
    }
}

impl From<&FallbackSection> for FallbackLanguages {
    fn from(section: &FallbackSection) -> Self {
        FallbackLanguages {
            scratch: section.scratch.to_lowercase(),
            left: section.left.to_lowercase(),
            right: section.right.to_lowercase(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 TUTOR__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 TUTOR__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, LessonError> {
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
        config::Environment::with_prefix("TUTOR")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| LessonError::Config(e.to_string()))
}

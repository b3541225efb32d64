//! 课程步骤数据模型
//!
//! LessonStep 一经创建（静态编写或由 Fallback Resolver 生成）即不可变；
//! FlowVariant 决定一个步骤携带几个语言槽位（Scratch 一个，Comparison 两个）。

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 全局兜底语言：槽位自身的 fallback key 也缺失时使用
pub const DEFAULT_FALLBACK_LANGUAGE: &str = "javascript";

/// 语言槽位：Scratch 只有 Main，Comparison 为 Left / Right
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Main,
    Left,
    Right,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Main => "main",
            Slot::Left => "left",
            Slot::Right => "right",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Slot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "main" | "" => Ok(Slot::Main),
            "left" | "l" => Ok(Slot::Left),
            "right" | "r" => Ok(Slot::Right),
            other => Err(format!("unknown slot: {}", other)),
        }
    }
}

/// 每个槽位缺少当前语言默认代码时使用的 fallback key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackLanguages {
    pub scratch: String,
    pub left: String,
    pub right: String,
}

impl Default for FallbackLanguages {
    fn default() -> Self {
        Self {
            scratch: "javascript".to_string(),
            left: "javascript".to_string(),
            right: "python".to_string(),
        }
    }
}

impl FallbackLanguages {
    pub fn for_slot(&self, slot: Slot) -> &str {
        match slot {
            Slot::Main => &self.scratch,
            Slot::Left => &self.left,
            Slot::Right => &self.right,
        }
    }
}

/// 课程流程：单语言 Scratch 或双语言对照 Comparison。会话开始时确定，之后不可变。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowVariant {
    Scratch { language: String },
    Comparison { left: String, right: String },
}

impl FlowVariant {
    pub fn scratch(language: impl Into<String>) -> Self {
        FlowVariant::Scratch {
            language: language.into().to_lowercase(),
        }
    }

    pub fn comparison(left: impl Into<String>, right: impl Into<String>) -> Self {
        FlowVariant::Comparison {
            left: left.into().to_lowercase(),
            right: right.into().to_lowercase(),
        }
    }

    /// 本流程激活的槽位（按显示顺序）
    pub fn slots(&self) -> &'static [Slot] {
        match self {
            FlowVariant::Scratch { .. } => &[Slot::Main],
            FlowVariant::Comparison { .. } => &[Slot::Left, Slot::Right],
        }
    }

    pub fn has_slot(&self, slot: Slot) -> bool {
        self.slots().contains(&slot)
    }

    /// 槽位对应的语言；槽位不属于本流程时返回 None
    pub fn language(&self, slot: Slot) -> Option<&str> {
        match (self, slot) {
            (FlowVariant::Scratch { language }, Slot::Main) => Some(language),
            (FlowVariant::Comparison { left, .. }, Slot::Left) => Some(left),
            (FlowVariant::Comparison { right, .. }, Slot::Right) => Some(right),
            _ => None,
        }
    }

    /// (slot, language) 列表，按槽位顺序
    pub fn languages(&self) -> Vec<(Slot, &str)> {
        self.slots()
            .iter()
            .filter_map(|s| self.language(*s).map(|l| (*s, l)))
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            FlowVariant::Scratch { .. } => "scratch",
            FlowVariant::Comparison { .. } => "comparison",
        }
    }
}

impl fmt::Display for FlowVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowVariant::Scratch { language } => write!(f, "scratch({})", language),
            FlowVariant::Comparison { left, right } => {
                write!(f, "comparison({} | {})", left, right)
            }
        }
    }
}

/// 单个课程步骤：标题、每个槽位的说明文字、语言 -> 默认代码
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonStep {
    pub title: String,
    pub prose: BTreeMap<Slot, String>,
    pub default_code: BTreeMap<String, String>,
}

impl LessonStep {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            prose: BTreeMap::new(),
            default_code: BTreeMap::new(),
        }
    }

    pub fn with_prose(mut self, slot: Slot, text: impl Into<String>) -> Self {
        self.prose.insert(slot, text.into());
        self
    }

    pub fn with_code(mut self, language: impl Into<String>, code: impl Into<String>) -> Self {
        self.default_code
            .insert(language.into().to_lowercase(), code.into());
        self
    }

    pub fn prose(&self, slot: Slot) -> &str {
        self.prose.get(&slot).map(String::as_str).unwrap_or("")
    }

    /// 默认代码解析链：language → fallback_key → DEFAULT_FALLBACK_LANGUAGE → ""
    pub fn default_code_for(&self, language: &str, fallback_key: &str) -> &str {
        [language, fallback_key, DEFAULT_FALLBACK_LANGUAGE]
            .into_iter()
            .find_map(|key| self.default_code.get(key))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// 语言的单行注释前缀（用于占位代码）
pub fn comment_prefix(language: &str) -> &'static str {
    match language.to_lowercase().as_str() {
        "python" | "ruby" | "shell" | "bash" | "sh" | "r" | "perl" | "elixir" | "yaml" => "#",
        "sql" | "haskell" | "lua" | "ada" => "--",
        _ => "//",
    }
}

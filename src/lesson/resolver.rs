//! Content Fallback Resolver：静态课程表之后的步骤由 LLM 生成
//!
//! 流程：构造 prompt → 调用 LlmClient → 剥离代码块围栏 → 按字段名解码 → 校验。
//! 任何一步失败都降级为确定性的占位步骤（Resolution::Degraded），不重试、不向上抛错，
//! 保证 advance() 总能得到下一步。

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::core::LessonError;
use crate::lesson::step::{comment_prefix, FlowVariant, LessonStep, Slot};
use crate::llm::{LlmClient, Message};

const SYSTEM_PROMPT: &str =
    "You are an expert programming tutor. You answer with a single JSON object and nothing else.";

/// 生成结果：正常解析，或降级为占位步骤（附原因）
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Ok(LessonStep),
    Degraded { step: LessonStep, reason: String },
}

impl Resolution {
    pub fn step(&self) -> &LessonStep {
        match self {
            Resolution::Ok(step) => step,
            Resolution::Degraded { step, .. } => step,
        }
    }

    pub fn into_step(self) -> LessonStep {
        match self {
            Resolution::Ok(step) => step,
            Resolution::Degraded { step, .. } => step,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Resolution::Degraded { .. })
    }
}

pub struct ContentFallbackResolver {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl ContentFallbackResolver {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// 为 `index` 处的步骤生成内容；永不失败
    pub async fn resolve(&self, index: usize, flow: &FlowVariant) -> Resolution {
        let messages = [
            Message::system(self.system_prompt.clone()),
            Message::user(build_prompt(index, flow)),
        ];

        let outcome = match self.llm.complete(&messages).await {
            Ok(text) => parse_step(&text, flow),
            Err(e) => Err(LessonError::ContentSource(e)),
        };

        match outcome {
            Ok(step) => {
                tracing::info!(index, title = %step.title, "Generated lesson step");
                Resolution::Ok(step)
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "Lesson content unavailable, using placeholder");
                Resolution::Degraded {
                    step: placeholder_step(index, flow),
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// 请求 prompt：字段顺序固定为 title、说明、defaultCode（仅为可读性，解析按字段名）
pub fn build_prompt(index: usize, flow: &FlowVariant) -> String {
    match flow {
        FlowVariant::Scratch { language } => format!(
            r#"Act as an expert tutor.
For the given lesson step, return ONLY valid JSON in the following format:
{{
  "title": "<Lesson Title>",
  "content": "<A brief description (2-3 lines max) of the lesson without code blocks>",
  "defaultCode": {{ "{language}": "<Default code for the lesson>" }}
}}
Ensure the keys appear exactly in this order: title, content, defaultCode.
Step #{index} for {language}.
"#
        ),
        FlowVariant::Comparison { left, right } => format!(
            r#"Act as an expert tutor. Provide a side-by-side lesson step comparing code in two languages.
Return ONLY valid JSON in the following format (no markdown):
{{
  "title": "<Lesson Title>",
  "contentLeft": "<A brief description for {left}>",
  "contentRight": "<A brief description for {right}>",
  "defaultCode": {{ "{left}": "<Default code for {left}>", "{right}": "<Default code for {right}>" }}
}}
Ensure the keys appear exactly in this order: title, contentLeft, contentRight, defaultCode.
Step #{index} for {left} and {right}.
"#
        ),
    }
}

/// 去掉开头围栏行（```json 等）与最后一个结尾围栏；值里嵌套的围栏原样保留
fn strip_fence(fenced: &str) -> &str {
    let rest = fenced.trim_start_matches('`');
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    match body.rfind("```") {
        Some(end) => &body[..end],
        None => body,
    }
}

/// 提取 JSON 文本：先剥掉包裹的围栏（整段以围栏开头，或围栏单独成行跟在说明文字后），
/// 再取最外层 {...}，否则返回去空白后的原文
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let body = if trimmed.starts_with("```") {
        strip_fence(trimmed)
    } else if let Some(pos) = trimmed.find("\n```") {
        strip_fence(&trimmed[pos + 1..])
    } else {
        trimmed
    };

    let body = body.trim();
    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    }
}

/// 生成内容的宽松解码结构；兼容旧字段 defaultCodeLeft / defaultCodeRight
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStep {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    content_left: Option<String>,
    #[serde(default)]
    content_right: Option<String>,
    #[serde(default)]
    default_code: Option<BTreeMap<String, String>>,
    #[serde(default)]
    default_code_left: Option<BTreeMap<String, String>>,
    #[serde(default)]
    default_code_right: Option<BTreeMap<String, String>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// 解析并校验 LLM 回复为 LessonStep
pub fn parse_step(text: &str, flow: &FlowVariant) -> Result<LessonStep, LessonError> {
    let json = extract_json(text);
    if json.is_empty() {
        return Err(LessonError::Parse("empty response".to_string()));
    }

    let raw: RawStep = serde_json::from_str(json)
        .map_err(|e| LessonError::Parse(format!("{}: {}", e, json)))?;

    let title = non_empty(raw.title)
        .ok_or_else(|| LessonError::Parse("missing field `title`".to_string()))?;

    let mut step = LessonStep::new(title);
    let mut content = raw.content;
    let mut content_left = raw.content_left;
    let mut content_right = raw.content_right;
    for &slot in flow.slots() {
        let (field, text) = match slot {
            Slot::Main => ("content", content.take()),
            Slot::Left => ("contentLeft", content_left.take()),
            Slot::Right => ("contentRight", content_right.take()),
        };
        let text = non_empty(text)
            .ok_or_else(|| LessonError::Parse(format!("missing field `{}`", field)))?;
        step.prose.insert(slot, text);
    }

    for map in [raw.default_code, raw.default_code_left, raw.default_code_right]
        .into_iter()
        .flatten()
    {
        for (language, code) in map {
            step.default_code
                .entry(language.trim().to_lowercase())
                .or_insert(code);
        }
    }
    if step.default_code.is_empty() {
        return Err(LessonError::Parse("missing field `defaultCode`".to_string()));
    }

    Ok(step)
}

/// 确定性占位步骤；只做字符串拼接，不会失败
pub fn placeholder_step(index: usize, flow: &FlowVariant) -> LessonStep {
    let mut step = LessonStep::new(format!("Step {} (AI)", index + 1));
    for (slot, language) in flow.languages() {
        step.prose
            .insert(slot, format!("Auto content for {}", language));
        step.default_code
            .entry(language.to_string())
            .or_insert_with(|| {
                format!("{} AI fallback code for {}", comment_prefix(language), language)
            });
    }
    step
}

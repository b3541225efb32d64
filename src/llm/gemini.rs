//! Gemini 客户端（走 Google 的 OpenAI 兼容端点）
//!
//! - Base URL: https://generativelanguage.googleapis.com/v1beta/openai
//! - 模型: gemini-1.5-flash（课程生成默认）

use crate::llm::OpenAiClient;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const GEMINI_FLASH: &str = "gemini-1.5-flash";

/// 创建 Gemini 客户端；Key 取 `GEMINI_API_KEY`
pub fn create_gemini_client(model: Option<&str>) -> OpenAiClient {
    let api_key = std::env::var("GEMINI_API_KEY")
        .unwrap_or_else(|_| "sk-placeholder".to_string());
    let model = model.unwrap_or(GEMINI_FLASH);

    OpenAiClient::new(Some(GEMINI_BASE_URL), model, Some(api_key.as_str()))
}

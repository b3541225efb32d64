//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Gemini / DeepSeek / Mock）

pub mod deepseek;
pub mod gemini;
pub mod message;
pub mod mock;
pub mod openai;
pub mod traits;

pub use deepseek::{create_deepseek_client, DEEPSEEK_CHAT};
pub use gemini::{create_gemini_client, GEMINI_FLASH};
pub use message::{Message, Role};
pub use mock::{MockLlmClient, ScriptedLlmClient};
pub use openai::{OpenAiClient, TokenUsage, OPENAI_DEFAULT_MODEL};
pub use traits::LlmClient;

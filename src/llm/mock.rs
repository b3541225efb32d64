//! Mock LLM 客户端（用于测试与离线运行，无需 API）
//!
//! - MockLlmClient：从 prompt 中读出步骤号与语言，返回一段合法的课程 JSON（包在 ```json 代码块中）
//! - ScriptedLlmClient：按顺序返回预设回复或错误，记录收到的 prompt

use std::collections::VecDeque;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use tokio::sync::Mutex;

use crate::llm::{LlmClient, Message, Role};

fn last_user(messages: &[Message]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| matches!(m.role, Role::User))
        .map(|m| m.content.as_str())
        .unwrap_or("(no input)")
}

fn step_line() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Step #(\d+) for ([^.\n]+)\.").ok())
        .as_ref()
}

/// Mock 客户端：生成可解析的课程步骤
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let prompt = last_user(messages);
        let (step, languages) = match step_line().and_then(|re| re.captures(prompt)) {
            Some(caps) => {
                let step = caps[1].parse::<usize>().unwrap_or(0);
                let langs: Vec<String> = caps[2]
                    .split(" and ")
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .collect();
                (step, langs)
            }
            None => (0, vec!["javascript".to_string()]),
        };

        let mut payload = json!({ "title": format!("Practice {}", step + 1) });
        if languages.len() >= 2 {
            payload["contentLeft"] = json!(format!("Mock lesson for {}", languages[0]));
            payload["contentRight"] = json!(format!("Mock lesson for {}", languages[1]));
        } else {
            payload["content"] = json!(format!("Mock lesson for {}", languages.join("")));
        }
        let code: serde_json::Map<String, serde_json::Value> = languages
            .iter()
            .map(|l| (l.clone(), json!(format!("// step {} in {}", step + 1, l))))
            .collect();
        payload["defaultCode"] = serde_json::Value::Object(code);

        Ok(format!("```json\n{}\n```", payload))
    }
}

/// 脚本化客户端：依次弹出预设结果；脚本耗尽后返回错误
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedLlmClient {
    pub fn new<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<String, String>>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// 每次回复前等待（模拟网络延迟）
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 已收到的 prompt（最后一条 user 消息）
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        self.prompts.lock().await.push(last_user(messages).to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err("script exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_reads_languages_from_prompt() {
        let out = MockLlmClient
            .complete(&[Message::user("Step #4 for javascript and python.")])
            .await
            .unwrap();
        assert!(out.starts_with("```json"));
        assert!(out.contains("contentLeft"));
        assert!(out.contains("Practice 5"));
        assert!(out.contains("python"));
    }

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let client = ScriptedLlmClient::new(vec![Ok("a".to_string()), Err("down".to_string())]);
        assert_eq!(client.complete(&[Message::user("1")]).await, Ok("a".to_string()));
        assert_eq!(client.complete(&[Message::user("2")]).await, Err("down".to_string()));
        assert!(client.complete(&[Message::user("3")]).await.is_err());
        assert_eq!(client.prompts().await, vec!["1", "2", "3"]);
    }
}

//! Tutor - 并排学习编程语言
//!
//! 模块划分：
//! - **cli**: 命令行参数（clap）与路由
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、视图投影、会话构建器、课程控制器
//! - **lesson**: 步骤模型、静态课程表、代码缓冲、内容降级生成、会话导航
//! - **llm**: LLM 客户端抽象与实现（Gemini / OpenAI 兼容 / DeepSeek / Mock）
//! - **observability**: tracing 初始化
//! - **progress**: 学习进度与本地持久化
//! - **ui**: ratatui 终端界面

pub mod cli;
pub mod config;
pub mod core;
pub mod lesson;
pub mod llm;
pub mod observability;
pub mod progress;
pub mod ui;

pub use crate::core::{Command, LessonError, LessonView, SessionBuilder};
pub use crate::lesson::{FlowVariant, LessonSession, LessonStep, Slot};

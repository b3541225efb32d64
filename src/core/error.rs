//! 课程会话错误类型
//!
//! 导航（advance / retreat）本身从不返回错误：内容获取与解析失败在 Resolver 内部降级为占位步骤。
//! 这里的错误只出现在缓冲写入越界、配置、进度持久化与控制器通道关闭等场景。

use thiserror::Error;

use crate::lesson::Slot;

#[derive(Error, Debug)]
pub enum LessonError {
    #[error("Step {index} out of range (session has {len} steps)")]
    StepOutOfRange { index: usize, len: usize },

    #[error("Slot {slot} is not active in this lesson flow")]
    SlotNotInFlow { slot: Slot },

    #[error("Content source error: {0}")]
    ContentSource(String),

    #[error("Lesson payload parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Lesson controller closed")]
    ControllerClosed,
}

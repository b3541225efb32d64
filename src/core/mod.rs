//! 核心层：错误类型、视图投影、会话构建与课程控制器

pub mod builder;
pub mod controller;
pub mod error;
pub mod state;

pub use builder::{create_llm_from_config, SessionBuilder};
pub use controller::{spawn_lesson, Command, LessonOutcome};
pub use error::LessonError;
pub use state::{LessonPhase, LessonView, SlotView};

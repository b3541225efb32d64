//! 课程会话：步骤模型、静态课程表、代码缓冲、内容降级生成、导航

pub mod buffers;
pub mod catalog;
pub mod resolver;
pub mod session;
pub mod step;
pub mod steps;

pub use buffers::CodeBufferCache;
pub use catalog::{BuiltinCatalog, FixedCatalog, StepCatalog};
pub use resolver::{
    build_prompt, extract_json, parse_step, placeholder_step, ContentFallbackResolver, Resolution,
};
pub use session::{Advanced, LessonSession, Retreat, StepSource};
pub use step::{
    comment_prefix, FallbackLanguages, FlowVariant, LessonStep, Slot, DEFAULT_FALLBACK_LANGUAGE,
};
pub use steps::StepList;

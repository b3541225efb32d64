//! Session Navigator：持有当前下标、只追加的步骤列表与代码缓冲
//!
//! 状态机：AtStep(i) --advance--> AtStep(i+1)（必要时生成新步骤），
//! AtStep(i) --retreat--> AtStep(i-1)（i > 0），AtStep(0) --retreat--> Exited。
//! 不存在跳转到任意步骤的操作。advance 需要 &mut self，同一会话同一时刻最多一个进行中的生成请求。

use std::collections::BTreeSet;

use crate::core::LessonError;
use crate::lesson::buffers::CodeBufferCache;
use crate::lesson::resolver::{placeholder_step, ContentFallbackResolver, Resolution};
use crate::lesson::step::{FallbackLanguages, FlowVariant, LessonStep, Slot};
use crate::lesson::steps::StepList;

/// 新步骤从哪里来
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepSource {
    /// 列表中已有（静态表或之前生成过）
    Known,
    /// 本次由 LLM 生成
    Generated,
    /// 本次生成失败，使用占位步骤
    Placeholder { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Advanced {
    pub index: usize,
    pub source: StepSource,
}

/// retreat 结果：移动到上一步，或在第 0 步退出会话
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Retreat {
    Moved(usize),
    Exit,
}

pub struct LessonSession {
    flow: FlowVariant,
    fallbacks: FallbackLanguages,
    steps: StepList,
    current: usize,
    buffers: CodeBufferCache,
    resolver: ContentFallbackResolver,
    placeholders: BTreeSet<usize>,
}

impl LessonSession {
    pub fn new(
        flow: FlowVariant,
        authored: Vec<LessonStep>,
        resolver: ContentFallbackResolver,
    ) -> Self {
        Self::with_fallbacks(flow, authored, resolver, FallbackLanguages::default())
    }

    /// 静态表为空时以占位步骤作为第 0 步，保证始终有一步可显示
    pub fn with_fallbacks(
        flow: FlowVariant,
        authored: Vec<LessonStep>,
        resolver: ContentFallbackResolver,
        fallbacks: FallbackLanguages,
    ) -> Self {
        let mut placeholders = BTreeSet::new();
        let authored = if authored.is_empty() {
            tracing::warn!(flow = %flow, "Empty static lesson table, starting from placeholder");
            placeholders.insert(0);
            vec![placeholder_step(0, &flow)]
        } else {
            authored
        };

        let mut session = Self {
            flow,
            fallbacks,
            steps: StepList::new(authored),
            current: 0,
            buffers: CodeBufferCache::new(),
            resolver,
            placeholders,
        };
        session.seed_current();
        session
    }

    pub fn flow(&self) -> &FlowVariant {
        &self.flow
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn static_len(&self) -> usize {
        self.steps.static_len()
    }

    pub fn steps(&self) -> &StepList {
        &self.steps
    }

    /// 当前步骤；current < len 恒成立，因此总是 Some
    pub fn current_step(&self) -> Option<&LessonStep> {
        self.steps.get(self.current)
    }

    /// 前进一步；越过已知步骤时调用 Resolver 生成新步骤。永不失败。
    pub async fn advance(&mut self) -> Advanced {
        let next = self.current + 1;
        let source = if next < self.steps.len() {
            StepSource::Known
        } else {
            match self.resolver.resolve(next, &self.flow).await {
                Resolution::Ok(step) => {
                    self.steps.append(step);
                    StepSource::Generated
                }
                Resolution::Degraded { step, reason } => {
                    let index = self.steps.append(step);
                    self.placeholders.insert(index);
                    StepSource::Placeholder { reason }
                }
            }
        };

        self.current = next;
        self.seed_current();
        tracing::debug!(index = next, total = self.steps.len(), ?source, "Advanced");
        Advanced {
            index: next,
            source,
        }
    }

    /// 后退一步；在第 0 步返回 Exit 且不修改状态
    pub fn retreat(&mut self) -> Retreat {
        if self.current == 0 {
            return Retreat::Exit;
        }
        self.current -= 1;
        Retreat::Moved(self.current)
    }

    /// 当前步骤各槽位：缓冲缺失时从默认代码播种，已有编辑不覆盖
    fn seed_current(&mut self) {
        let index = self.current;
        let Some(step) = self.steps.get(index) else {
            return;
        };
        for (slot, language) in self.flow.languages() {
            let default = step.default_code_for(language, self.fallbacks.for_slot(slot));
            if self.buffers.seed(index, slot, default) {
                tracing::debug!(index, %slot, language, "Seeded code buffer");
            }
        }
    }

    fn check(&self, index: usize, slot: Slot) -> Result<&LessonStep, LessonError> {
        if !self.flow.has_slot(slot) {
            return Err(LessonError::SlotNotInFlow { slot });
        }
        self.steps.get(index).ok_or(LessonError::StepOutOfRange {
            index,
            len: self.steps.len(),
        })
    }

    /// 读取代码：有缓冲返回缓冲，否则返回默认代码（解析链见 LessonStep::default_code_for）。纯读取。
    pub fn code(&self, index: usize, slot: Slot) -> Result<&str, LessonError> {
        let step = self.check(index, slot)?;
        let language = self.flow.language(slot).unwrap_or_default();
        let default = step.default_code_for(language, self.fallbacks.for_slot(slot));
        Ok(self.buffers.resolve(index, slot, default))
    }

    /// 覆盖某一步某槽位的代码（不校验代码内容，不回写 defaultCode）
    pub fn set_code(
        &mut self,
        index: usize,
        slot: Slot,
        text: impl Into<String>,
    ) -> Result<(), LessonError> {
        self.check(index, slot)?;
        self.buffers.set(index, slot, text);
        Ok(())
    }

    /// 编辑器 onChange：写入当前步骤
    pub fn edit_current(&mut self, slot: Slot, text: impl Into<String>) -> Result<(), LessonError> {
        self.set_code(self.current, slot, text)
    }

    /// 该步骤是否为降级生成的占位内容
    pub fn is_placeholder(&self, index: usize) -> bool {
        self.placeholders.contains(&index)
    }

    pub fn buffers(&self) -> &CodeBufferCache {
        &self.buffers
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::lesson::catalog::{BuiltinCatalog, StepCatalog};
    use crate::llm::{LlmClient, MockLlmClient, ScriptedLlmClient};

    fn resolver(llm: Arc<dyn LlmClient>) -> ContentFallbackResolver {
        ContentFallbackResolver::new(llm)
    }

    fn failing() -> ContentFallbackResolver {
        resolver(Arc::new(ScriptedLlmClient::new(Vec::new())))
    }

    fn scratch_session(language: &str, resolver: ContentFallbackResolver) -> LessonSession {
        let flow = FlowVariant::scratch(language);
        let steps = BuiltinCatalog.static_steps(&flow);
        LessonSession::new(flow, steps, resolver)
    }

    #[test]
    fn test_new_session_reads_static_default() {
        let session = scratch_session("python", failing());
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.code(0, Slot::Main).unwrap(), r#"print("Hello World")"#);
        assert_eq!(session.current_step().unwrap().title, "Hello World");
    }

    #[tokio::test]
    async fn test_edit_survives_round_trip() {
        let mut session = scratch_session("python", failing());
        session.edit_current(Slot::Main, "print(1)").unwrap();

        let adv = session.advance().await;
        assert_eq!(adv, Advanced { index: 1, source: StepSource::Known });
        assert_eq!(session.retreat(), Retreat::Moved(0));
        assert_eq!(session.code(0, Slot::Main).unwrap(), "print(1)");

        session.advance().await;
        assert_eq!(
            session.code(1, Slot::Main).unwrap(),
            "x = 42\nprint(\"The answer is\", x)"
        );
    }

    #[tokio::test]
    async fn test_advance_past_table_appends_placeholder_on_failure() {
        let mut session = scratch_session("python", failing());
        session.advance().await;
        session.advance().await;
        assert_eq!(session.current_index(), 2);
        assert_eq!(session.len(), 3);

        let adv = session.advance().await;
        assert_eq!(adv.index, 3);
        assert!(matches!(adv.source, StepSource::Placeholder { .. }));
        assert_eq!(session.len(), 4);
        assert_eq!(session.current_index(), 3);
        assert_eq!(session.current_step().unwrap().title, "Step 4 (AI)");
        assert!(session.is_placeholder(3));
        assert!(!session.is_placeholder(2));
        assert_eq!(
            session.code(3, Slot::Main).unwrap(),
            "# AI fallback code for python"
        );
        // 静态前缀未变
        assert_eq!(session.static_len(), 3);
        assert_eq!(session.steps().get(2).map(|s| s.title.as_str()), Some("Functions"));
    }

    #[tokio::test]
    async fn test_generated_step_is_kept_on_revisit() {
        let mut session = scratch_session("javascript", resolver(Arc::new(MockLlmClient)));
        for _ in 0..3 {
            session.advance().await;
        }
        let adv = session.advance().await;
        assert_eq!(adv.source, StepSource::Generated);
        assert_eq!(session.len(), 5);

        assert_eq!(session.retreat(), Retreat::Moved(3));
        let adv = session.advance().await;
        assert_eq!(adv.source, StepSource::Known);
        assert_eq!(session.len(), 5);
    }

    #[test]
    fn test_retreat_at_start_exits_without_mutation() {
        let mut session = scratch_session("python", failing());
        assert_eq!(session.retreat(), Retreat::Exit);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn test_comparison_missing_language_falls_back() {
        let flow = FlowVariant::comparison("javascript", "python");
        let steps = vec![LessonStep::new("JS only")
            .with_prose(Slot::Left, "left")
            .with_prose(Slot::Right, "right")
            .with_code("javascript", "console.log(1);")];
        let session = LessonSession::new(flow, steps, failing());
        assert_eq!(session.code(0, Slot::Right).unwrap(), "console.log(1);");
        assert_eq!(session.code(0, Slot::Left).unwrap(), "console.log(1);");
    }

    #[test]
    fn test_custom_fallback_languages() {
        let flow = FlowVariant::comparison("rust", "go");
        let steps = vec![LessonStep::new("Hello")
            .with_code("javascript", "js")
            .with_code("python", "py")];
        let fallbacks = FallbackLanguages {
            scratch: "javascript".into(),
            left: "python".into(),
            right: "javascript".into(),
        };
        let session = LessonSession::with_fallbacks(flow, steps, failing(), fallbacks);
        assert_eq!(session.code(0, Slot::Left).unwrap(), "py");
        assert_eq!(session.code(0, Slot::Right).unwrap(), "js");
    }

    #[test]
    fn test_buffer_writes_are_checked() {
        let mut session = scratch_session("python", failing());
        assert!(matches!(
            session.set_code(7, Slot::Main, "x"),
            Err(LessonError::StepOutOfRange { index: 7, len: 3 })
        ));
        assert!(matches!(
            session.set_code(0, Slot::Left, "x"),
            Err(LessonError::SlotNotInFlow { slot: Slot::Left })
        ));
        assert!(session.code(0, Slot::Right).is_err());
    }

    #[test]
    fn test_empty_table_starts_with_placeholder() {
        let session = LessonSession::new(FlowVariant::scratch("go"), Vec::new(), failing());
        assert_eq!(session.len(), 1);
        assert_eq!(session.current_step().unwrap().title, "Step 1 (AI)");
        assert_eq!(session.code(0, Slot::Main).unwrap(), "// AI fallback code for go");
    }

    #[tokio::test]
    async fn test_index_bounds_hold_under_random_walk() {
        let mut session = scratch_session("python", failing());
        let walk = [true, true, false, true, true, true, false, false, true, false, false, false, false];
        for forward in walk {
            if forward {
                session.advance().await;
            } else {
                session.retreat();
            }
            assert!(session.current_index() < session.len());
        }
    }
}

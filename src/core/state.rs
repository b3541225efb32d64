//! 状态投影：LessonView
//!
//! UI 只持有轻量的 LessonView（阶段、当前步骤内容、各槽位代码）；完整的 LessonSession 由控制器独占。

use serde::Serialize;

use crate::lesson::{LessonSession, Slot};

/// 会话阶段（UI 投影用）
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum LessonPhase {
    Ready,
    /// 正在生成下一步；此时导航输入被忽略
    Loading,
    Exited,
}

/// 单个槽位的渲染数据
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotView {
    pub slot: Slot,
    pub language: String,
    pub prose: String,
    pub code: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct LessonView {
    pub phase: LessonPhase,
    pub flow: String,
    pub index: usize,
    pub total: usize,
    pub title: String,
    pub slots: Vec<SlotView>,
    /// 当前步骤是占位内容
    pub degraded: bool,
    pub input_locked: bool,
}

impl Default for LessonView {
    fn default() -> Self {
        Self {
            phase: LessonPhase::Ready,
            flow: String::new(),
            index: 0,
            total: 0,
            title: String::new(),
            slots: Vec::new(),
            degraded: false,
            input_locked: false,
        }
    }
}

impl LessonView {
    /// 从会话投影出 UI 状态
    pub fn project(session: &LessonSession, phase: LessonPhase) -> Self {
        let step = session.current_step();
        let index = session.current_index();
        let slots = session
            .flow()
            .languages()
            .into_iter()
            .map(|(slot, language)| SlotView {
                slot,
                language: language.to_string(),
                prose: step.map(|s| s.prose(slot)).unwrap_or_default().to_string(),
                code: session.code(index, slot).unwrap_or_default().to_string(),
            })
            .collect();

        Self {
            input_locked: phase == LessonPhase::Loading,
            phase,
            flow: session.flow().to_string(),
            index,
            total: session.len(),
            title: step.map(|s| s.title.clone()).unwrap_or_default(),
            slots,
            degraded: session.is_placeholder(index),
        }
    }

    /// 「Step i of n」
    pub fn progress_label(&self) -> String {
        format!("Step {} of {}", self.index + 1, self.total)
    }

    pub fn slot(&self, slot: Slot) -> Option<&SlotView> {
        self.slots.iter().find(|s| s.slot == slot)
    }
}

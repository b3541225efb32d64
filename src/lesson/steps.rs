//! 只追加的步骤列表：静态前缀 + 运行时生成的步骤

use std::sync::Arc;

use crate::lesson::step::LessonStep;

/// 只暴露读取与追加；没有原地修改或截断
#[derive(Clone, Debug)]
pub struct StepList {
    authored: Arc<[LessonStep]>,
    generated: Vec<LessonStep>,
}

impl StepList {
    pub fn new(authored: Vec<LessonStep>) -> Self {
        Self {
            authored: authored.into(),
            generated: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.authored.len() + self.generated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 静态表长度（会话开始时的步骤数）
    pub fn static_len(&self) -> usize {
        self.authored.len()
    }

    pub fn get(&self, index: usize) -> Option<&LessonStep> {
        if index < self.authored.len() {
            self.authored.get(index)
        } else {
            self.generated.get(index - self.authored.len())
        }
    }

    /// 追加一个步骤，返回其下标
    pub fn append(&mut self, step: LessonStep) -> usize {
        self.generated.push(step);
        self.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &LessonStep> {
        self.authored.iter().chain(self.generated.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_after_static_prefix() {
        let mut list = StepList::new(vec![LessonStep::new("a"), LessonStep::new("b")]);
        assert_eq!(list.static_len(), 2);
        let idx = list.append(LessonStep::new("c"));
        assert_eq!(idx, 2);
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(2).map(|s| s.title.as_str()), Some("c"));
        assert_eq!(list.get(0).map(|s| s.title.as_str()), Some("a"));
        assert!(list.get(3).is_none());
        let titles: Vec<_> = list.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_table() {
        let mut list = StepList::new(Vec::new());
        assert!(list.is_empty());
        assert_eq!(list.append(LessonStep::new("x")), 0);
        assert_eq!(list.static_len(), 0);
    }
}

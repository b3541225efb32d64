//! 代码缓冲缓存：(步骤下标, 槽位) -> 用户当前编辑的代码
//!
//! 首次进入某步骤时由 Navigator 从 defaultCode 播种；之后的编辑只改缓冲，不回写 defaultCode。
//! 会话期间缓冲从不删除，来回翻页不会丢失编辑。

use std::collections::HashMap;

use crate::lesson::step::Slot;

#[derive(Clone, Debug, Default)]
pub struct CodeBufferCache {
    buffers: HashMap<(usize, Slot), String>,
}

impl CodeBufferCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, step: usize, slot: Slot) -> Option<&str> {
        self.buffers.get(&(step, slot)).map(String::as_str)
    }

    /// 已有缓冲时不覆盖；返回是否新播种
    pub fn seed(&mut self, step: usize, slot: Slot, default: &str) -> bool {
        if self.buffers.contains_key(&(step, slot)) {
            return false;
        }
        self.buffers.insert((step, slot), default.to_string());
        true
    }

    /// 无条件覆盖
    pub fn set(&mut self, step: usize, slot: Slot, text: impl Into<String>) {
        self.buffers.insert((step, slot), text.into());
    }

    /// 只读解析：有缓冲返回缓冲，否则返回给定默认值，不修改状态
    pub fn resolve<'a>(&'a self, step: usize, slot: Slot, default: &'a str) -> &'a str {
        self.cached(step, slot).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_idempotent() {
        let mut cache = CodeBufferCache::new();
        assert!(cache.seed(0, Slot::Main, "print(0)"));
        assert!(!cache.seed(0, Slot::Main, "print(0)"));
        assert_eq!(cache.cached(0, Slot::Main), Some("print(0)"));
    }

    #[test]
    fn test_seed_does_not_clobber_edit() {
        let mut cache = CodeBufferCache::new();
        cache.seed(1, Slot::Left, "a");
        cache.set(1, Slot::Left, "edited");
        cache.seed(1, Slot::Left, "a");
        assert_eq!(cache.cached(1, Slot::Left), Some("edited"));
    }

    #[test]
    fn test_resolve_is_pure() {
        let cache = CodeBufferCache::new();
        assert_eq!(cache.resolve(3, Slot::Right, "default"), "default");
        assert!(cache.is_empty());
    }
}

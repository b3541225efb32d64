//! 进度持久化：单文件 JSON；文件不存在时返回空进度

use std::path::{Path, PathBuf};

use crate::core::LessonError;
use crate::progress::ProgressStore;

#[derive(Debug, Clone)]
pub struct ProgressPersistence {
    path: PathBuf,
}

impl ProgressPersistence {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 默认文件名：<data_dir>/progress.json
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join("progress.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<ProgressStore, LessonError> {
        if !self.path.exists() {
            return Ok(ProgressStore::default());
        }
        let data = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// 父目录不存在时自动创建
    pub fn save(&self, store: &ProgressStore) -> Result<(), LessonError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(store)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let p = ProgressPersistence::in_dir(dir.path());
        assert_eq!(p.load().unwrap(), ProgressStore::default());
    }

    #[test]
    fn test_save_creates_parent_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let p = ProgressPersistence::in_dir(dir.path().join("nested/data"));
        let mut store = ProgressStore::new();
        store.complete_lesson("rust", "scratch:0", 42);
        store.add_points(10);
        p.save(&store).unwrap();

        assert_eq!(p.load().unwrap(), store);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = ProgressPersistence::in_dir(dir.path());
        std::fs::write(p.path(), "not json").unwrap();
        assert!(matches!(p.load(), Err(LessonError::Serde(_))));
    }
}

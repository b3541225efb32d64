//! 学习进度：每种语言已完成的课程、成就、连续学习天数、积分
//!
//! 时间统一用 Unix 毫秒（i64）；需要「现在」的操作接受显式的 now_ms，便于测试。

pub mod persistence;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use persistence::ProgressPersistence;

use crate::lesson::FlowVariant;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// 每离开一个新完成的步骤获得的积分
pub const POINTS_PER_STEP: u64 = 10;

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageProgress {
    pub language: String,
    pub completed_lessons: Vec<String>,
    pub total_time_secs: u64,
    pub last_accessed_ms: i64,
    pub skill_level: SkillLevel,
}

impl LanguageProgress {
    fn new(language: &str, now_ms: i64) -> Self {
        Self {
            language: language.to_string(),
            completed_lessons: Vec::new(),
            total_time_secs: 0,
            last_accessed_ms: now_ms,
            skill_level: SkillLevel::Beginner,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub unlocked_at_ms: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
    pub last_activity_ms: i64,
}

/// 进度存储（纯内存；落盘见 ProgressPersistence）
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressStore {
    pub languages: BTreeMap<String, LanguageProgress>,
    pub achievements: Vec<Achievement>,
    pub streak: Streak,
    pub total_points: u64,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language(&self, language: &str) -> Option<&LanguageProgress> {
        self.languages.get(language)
    }

    fn entry(&mut self, language: &str, now_ms: i64) -> &mut LanguageProgress {
        let progress = self
            .languages
            .entry(language.to_string())
            .or_insert_with(|| LanguageProgress::new(language, now_ms));
        progress.last_accessed_ms = now_ms;
        progress
    }

    /// 记录完成一课；已完成过则返回 false，状态不变
    pub fn complete_lesson(&mut self, language: &str, lesson_id: &str, now_ms: i64) -> bool {
        let already = self
            .languages
            .get(language)
            .map(|p| p.completed_lessons.iter().any(|id| id == lesson_id))
            .unwrap_or(false);
        if already {
            return false;
        }
        self.entry(language, now_ms)
            .completed_lessons
            .push(lesson_id.to_string());
        true
    }

    pub fn record_time(&mut self, language: &str, secs: u64, now_ms: i64) {
        self.entry(language, now_ms).total_time_secs += secs;
    }

    pub fn set_skill_level(&mut self, language: &str, level: SkillLevel, now_ms: i64) {
        self.entry(language, now_ms).skill_level = level;
    }

    pub fn add_achievement(
        &mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        now_ms: i64,
    ) {
        self.achievements.push(Achievement {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            unlocked_at_ms: now_ms,
        });
    }

    /// 距上次活动不超过 1 天则连续天数 +1，否则重置为 1
    pub fn update_streak(&mut self, now_ms: i64) {
        let days = (now_ms - self.streak.last_activity_ms).max(0) / DAY_MS;
        let current = if days <= 1 {
            self.streak.current + 1
        } else {
            1
        };
        self.streak = Streak {
            current,
            longest: self.streak.longest.max(current),
            last_activity_ms: now_ms,
        };
    }

    pub fn add_points(&mut self, points: u64) {
        self.total_points += points;
    }
}

/// 课程控制器使用的进度记录器：内存进度 + 可选落盘。落盘失败只记日志，不影响导航。
#[derive(Debug, Default)]
pub struct ProgressTracker {
    store: ProgressStore,
    persistence: Option<ProgressPersistence>,
}

impl ProgressTracker {
    pub fn new(store: ProgressStore, persistence: Option<ProgressPersistence>) -> Self {
        Self { store, persistence }
    }

    /// 从文件加载；文件损坏时从空进度开始
    pub fn open(persistence: ProgressPersistence) -> Self {
        let store = persistence.load().unwrap_or_else(|e| {
            tracing::warn!(path = %persistence.path().display(), error = %e, "Progress load failed, starting fresh");
            ProgressStore::default()
        });
        Self::new(store, Some(persistence))
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// 记录离开 `index` 步（视为完成）；有新完成的课程时加分并更新连续天数
    pub fn record_step(&mut self, flow: &FlowVariant, index: usize) -> bool {
        let lesson_id = format!("{}:{}", flow.name(), index);
        let now = now_ms();
        let mut fresh = false;
        for (_, language) in flow.languages() {
            fresh |= self.store.complete_lesson(language, &lesson_id, now);
        }
        if !fresh {
            return false;
        }
        self.store.add_points(POINTS_PER_STEP);
        self.store.update_streak(now);

        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.save(&self.store) {
                tracing::warn!(path = %persistence.path().display(), error = %e, "Progress save failed");
            }
        }
        true
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_percent, require_text};
use crate::store::{Entity, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ModuleStatus {
    pub fn from_lessons(completed: u32, total: u32) -> Self {
        if completed == 0 {
            ModuleStatus::NotStarted
        } else if completed >= total {
            ModuleStatus::Completed
        } else {
            ModuleStatus::InProgress
        }
    }
}

/// A learning module together with the learner's progress through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    pub title: String,
    pub category: String,
    pub difficulty: Difficulty,
    /// Percent complete, 0..=100.
    pub progress: u8,
    pub completed_lessons: u32,
    pub lessons: u32,
    #[serde(default)]
    pub quiz_score: Option<u8>,
    #[serde(default)]
    pub badges: Vec<String>,
    pub status: ModuleStatus,
}

impl Module {
    /// Progress implied by the lesson counts, rounded to the nearest percent.
    pub fn lesson_progress(&self) -> u8 {
        if self.lessons == 0 {
            return 0;
        }
        let pct = (f64::from(self.completed_lessons) * 100.0 / f64::from(self.lessons)).round();
        pct.clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModuleDraft {
    pub title: String,
    pub category: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,
    pub lessons: u32,
    #[serde(default)]
    pub completed_lessons: u32,
    /// Derived from the lesson counts when omitted.
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub quiz_score: Option<u8>,
    #[serde(default)]
    pub badges: Vec<String>,
    /// Derived from the lesson counts when omitted.
    #[serde(default)]
    pub status: Option<ModuleStatus>,
}

fn default_difficulty() -> Difficulty {
    Difficulty::Beginner
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModulePatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub progress: Option<u8>,
    pub completed_lessons: Option<u32>,
    pub lessons: Option<u32>,
    pub quiz_score: Option<u8>,
    pub badges: Option<Vec<String>>,
    pub status: Option<ModuleStatus>,
}

impl Entity for Module {
    type Draft = ModuleDraft;
    type Patch = ModulePatch;
    const COLLECTION: &'static str = "modules";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, d: ModuleDraft) -> Self {
        let mut module = Self {
            id,
            title: d.title,
            category: d.category,
            difficulty: d.difficulty,
            progress: 0,
            completed_lessons: d.completed_lessons,
            lessons: d.lessons,
            quiz_score: d.quiz_score,
            badges: d.badges,
            status: ModuleStatus::from_lessons(d.completed_lessons, d.lessons),
        };
        module.progress = d.progress.unwrap_or_else(|| module.lesson_progress());
        if let Some(status) = d.status {
            module.status = status;
        }
        module
    }

    fn apply_patch(&mut self, p: ModulePatch) {
        if let Some(v) = p.title {
            self.title = v;
        }
        if let Some(v) = p.category {
            self.category = v;
        }
        if let Some(v) = p.difficulty {
            self.difficulty = v;
        }
        if let Some(v) = p.progress {
            self.progress = v;
        }
        if let Some(v) = p.completed_lessons {
            self.completed_lessons = v;
        }
        if let Some(v) = p.lessons {
            self.lessons = v;
        }
        if p.quiz_score.is_some() {
            self.quiz_score = p.quiz_score;
        }
        if let Some(v) = p.badges {
            self.badges = v;
        }
        if let Some(v) = p.status {
            self.status = v;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_percent("progress", self.progress)?;
        if self.completed_lessons > self.lessons {
            return Err(ValidationError::new(
                "completedLessons",
                format!(
                    "completed lessons ({}) exceed total lessons ({})",
                    self.completed_lessons, self.lessons
                ),
            ));
        }
        if let Some(score) = self.quiz_score {
            require_percent("quizScore", score)?;
        }
        Ok(())
    }
}

/// Why a badge was awarded. Used to keep awards unique per module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeRule {
    ModuleCompleted,
    QuizPassed,
    QuizExcellence,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub category: String,
    pub earned_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(default = "default_badge_rule")]
    pub rule: BadgeRule,
}

fn default_badge_rule() -> BadgeRule {
    BadgeRule::Manual
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BadgeDraft {
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default = "default_badge_icon")]
    pub icon: String,
    #[serde(default = "default_badge_category")]
    pub category: String,
    #[serde(default = "Utc::now")]
    pub earned_at: DateTime<Utc>,
    #[serde(default)]
    pub module_id: Option<String>,
    #[serde(default = "default_badge_rule")]
    pub rule: BadgeRule,
}

impl BadgeDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: default_badge_icon(),
            category: default_badge_category(),
            earned_at: Utc::now(),
            module_id: None,
            rule: BadgeRule::Manual,
        }
    }
}

fn default_badge_icon() -> String {
    "medal".to_string()
}

fn default_badge_category() -> String {
    "general".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BadgePatch {
    #[serde(alias = "title")]
    pub name: Option<String>,
    pub icon: Option<String>,
    pub category: Option<String>,
}

impl Entity for Badge {
    type Draft = BadgeDraft;
    type Patch = BadgePatch;
    const COLLECTION: &'static str = "badges";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, d: BadgeDraft) -> Self {
        Self {
            id,
            name: d.name,
            icon: d.icon,
            category: d.category,
            earned_at: d.earned_at,
            module_id: d.module_id,
            rule: d.rule,
        }
    }

    fn apply_patch(&mut self, p: BadgePatch) {
        if let Some(v) = p.name {
            self.name = v;
        }
        if let Some(v) = p.icon {
            self.icon = v;
        }
        if let Some(v) = p.category {
            self.category = v;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_derives_progress_and_status_from_lessons() {
        let draft: ModuleDraft = serde_json::from_value(serde_json::json!({
            "title": "Flood Safety",
            "category": "flood",
            "lessons": 4,
            "completedLessons": 1
        }))
        .expect("draft");
        let module = Module::from_draft("m".into(), draft);
        assert_eq!(module.progress, 25);
        assert_eq!(module.status, ModuleStatus::InProgress);
        assert_eq!(module.difficulty, Difficulty::Beginner);
    }

    #[test]
    fn completed_lessons_cannot_exceed_total() {
        let mut module = Module::from_draft(
            "m".into(),
            serde_json::from_value(serde_json::json!({
                "title": "Fire Drill",
                "category": "fire",
                "lessons": 2
            }))
            .expect("draft"),
        );
        module.completed_lessons = 3;
        assert_eq!(
            module.validate().map_err(|e| e.field),
            Err("completedLessons")
        );
    }

    #[test]
    fn badge_draft_accepts_title_spelling() {
        let draft: BadgeDraft =
            serde_json::from_value(serde_json::json!({ "title": "Quiz Master" }))
                .expect("draft");
        let badge = Badge::from_draft("b1".into(), draft);
        assert_eq!(badge.name, "Quiz Master");
        assert_eq!(badge.rule, BadgeRule::Manual);
        assert!(badge.validate().is_ok());

        let named = Badge::from_draft("b2".into(), BadgeDraft::named("Quiz Master"));
        assert_eq!(named.name, badge.name);
        assert_eq!(named.icon, badge.icon);
        assert_eq!(named.category, badge.category);

        let patch: BadgePatch =
            serde_json::from_value(serde_json::json!({ "title": "Drill Captain" }))
                .expect("patch");
        assert_eq!(patch.name.as_deref(), Some("Drill Captain"));
    }

    #[test]
    fn patch_rejects_id_field() {
        let res: Result<ModulePatch, _> =
            serde_json::from_value(serde_json::json!({ "id": "other" }));
        assert!(res.is_err());
    }
}

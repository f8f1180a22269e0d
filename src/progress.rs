//! Read-derived learning statistics and the badge ledger.

use chrono::Utc;
use serde::Serialize;

use crate::config::Policy;
use crate::model::{Badge, BadgeDraft, BadgeRule, Module, ModuleStatus};
use crate::store::{PersistentStore, ValidationError};

fn rounded_mean(values: impl Iterator<Item = f64>) -> u8 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return 0;
    }
    (sum / count as f64).round().clamp(0.0, 100.0) as u8
}

/// Mean of every module's progress, rounded; 0 when there are no modules.
pub fn overall_progress(modules: &[Module]) -> u8 {
    rounded_mean(modules.iter().map(|m| f64::from(m.progress)))
}

pub fn completed_modules(modules: &[Module]) -> usize {
    modules
        .iter()
        .filter(|m| m.status == ModuleStatus::Completed)
        .count()
}

/// Mean of the recorded quiz scores, rounded; 0 when none are recorded.
pub fn average_quiz_score(modules: &[Module]) -> u8 {
    rounded_mean(modules.iter().filter_map(|m| m.quiz_score).map(f64::from))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub id: String,
    pub title: String,
    pub status: ModuleStatus,
    pub progress: u8,
    pub completed_lessons: u32,
    pub lessons: u32,
    pub quiz_score: Option<u8>,
}

impl From<&Module> for ModuleProgress {
    fn from(m: &Module) -> Self {
        Self {
            id: m.id.clone(),
            title: m.title.clone(),
            status: m.status,
            progress: m.progress,
            completed_lessons: m.completed_lessons,
            lessons: m.lessons,
            quiz_score: m.quiz_score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub overall_progress: u8,
    pub completed_modules: usize,
    pub total_modules: usize,
    pub average_quiz_score: u8,
    pub badges: Vec<Badge>,
    pub modules: Vec<ModuleProgress>,
}

pub fn summarize(modules: &[Module], badges: &[Badge]) -> ProgressSummary {
    ProgressSummary {
        overall_progress: overall_progress(modules),
        completed_modules: completed_modules(modules),
        total_modules: modules.len(),
        average_quiz_score: average_quiz_score(modules),
        badges: badges.to_vec(),
        modules: modules.iter().map(ModuleProgress::from).collect(),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    pub module: Module,
    pub score: u8,
    pub passed: bool,
    pub new_badges: Vec<Badge>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonOutcome {
    pub module: Module,
    pub newly_completed: bool,
    pub new_badges: Vec<Badge>,
}

/// Records learner results against the module collection and appends badges
/// whose conditions become satisfied. A badge is awarded at most once per
/// module and rule.
pub struct ProgressTracker<'a> {
    modules: &'a mut PersistentStore<Module>,
    badges: &'a mut PersistentStore<Badge>,
    policy: &'a Policy,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(
        modules: &'a mut PersistentStore<Module>,
        badges: &'a mut PersistentStore<Badge>,
        policy: &'a Policy,
    ) -> Self {
        Self {
            modules,
            badges,
            policy,
        }
    }

    /// Stores `score` (the best score is kept) and awards quiz badges.
    /// Returns `Ok(None)` if the module does not exist.
    pub fn record_quiz_result(
        &mut self,
        module_id: &str,
        score: u8,
    ) -> Result<Option<QuizOutcome>, ValidationError> {
        if score > 100 {
            return Err(ValidationError::new(
                "score",
                format!("must be between 0 and 100, got {score}"),
            ));
        }
        let Some(current) = self.modules.read(module_id).cloned() else {
            return Ok(None);
        };

        let best = current.quiz_score.map_or(score, |s| s.max(score));
        let mut rules = Vec::new();
        if best >= self.policy.quiz_pass_threshold {
            rules.push(BadgeRule::QuizPassed);
        }
        if best >= self.policy.quiz_excellence_threshold {
            rules.push(BadgeRule::QuizExcellence);
        }
        let drafts = self.pending_badges(&current, &rules);

        let names: Vec<String> = drafts.iter().map(|d| d.name.clone()).collect();
        let Some(module) = self.modules.modify(module_id, |m| {
            m.quiz_score = Some(best);
            append_names(&mut m.badges, &names);
        })?
        else {
            return Ok(None);
        };
        let new_badges = self.create_badges(drafts)?;

        tracing::info!(
            module_id,
            score,
            best,
            awarded = new_badges.len(),
            "quiz result recorded"
        );
        Ok(Some(QuizOutcome {
            module,
            score,
            passed: score >= self.policy.quiz_pass_threshold,
            new_badges,
        }))
    }

    /// Marks one more lesson complete, recomputing progress and status.
    /// Completing the last lesson awards the completion badge. Calling this on
    /// a finished module changes nothing.
    pub fn record_lesson_completed(
        &mut self,
        module_id: &str,
    ) -> Result<Option<LessonOutcome>, ValidationError> {
        let Some(current) = self.modules.read(module_id).cloned() else {
            return Ok(None);
        };
        if current.lessons > 0 && current.completed_lessons >= current.lessons {
            return Ok(Some(LessonOutcome {
                module: current,
                newly_completed: false,
                new_badges: Vec::new(),
            }));
        }

        let completed = (current.completed_lessons + 1).min(current.lessons);
        let status = ModuleStatus::from_lessons(completed, current.lessons);
        let newly_completed =
            status == ModuleStatus::Completed && current.status != ModuleStatus::Completed;

        let drafts = if newly_completed && self.policy.completion_badge {
            self.pending_badges(&current, &[BadgeRule::ModuleCompleted])
        } else {
            Vec::new()
        };
        let names: Vec<String> = drafts.iter().map(|d| d.name.clone()).collect();

        let Some(module) = self.modules.modify(module_id, |m| {
            m.completed_lessons = completed;
            m.progress = m.lesson_progress();
            m.status = status;
            append_names(&mut m.badges, &names);
        })?
        else {
            return Ok(None);
        };
        let new_badges = self.create_badges(drafts)?;

        tracing::info!(
            module_id,
            completed,
            lessons = module.lessons,
            newly_completed,
            "lesson completed"
        );
        Ok(Some(LessonOutcome {
            module,
            newly_completed,
            new_badges,
        }))
    }

    fn pending_badges(&self, module: &Module, rules: &[BadgeRule]) -> Vec<BadgeDraft> {
        rules
            .iter()
            .copied()
            .filter(|rule| {
                !self
                    .badges
                    .list()
                    .iter()
                    .any(|b| b.rule == *rule && b.module_id.as_deref() == Some(module.id.as_str()))
            })
            .map(|rule| {
                let (name, icon) = match rule {
                    BadgeRule::QuizPassed => (
                        format!("{} Quiz Passed", module.title),
                        self.policy.pass_icon.clone(),
                    ),
                    BadgeRule::QuizExcellence => (
                        format!("{} Quiz Excellence", module.title),
                        self.policy.excellence_icon.clone(),
                    ),
                    BadgeRule::ModuleCompleted | BadgeRule::Manual => (
                        format!("{} Complete", module.title),
                        self.policy.completion_icon.clone(),
                    ),
                };
                BadgeDraft {
                    name,
                    icon,
                    category: module.category.clone(),
                    earned_at: Utc::now(),
                    module_id: Some(module.id.clone()),
                    rule,
                }
            })
            .collect()
    }

    fn create_badges(&mut self, drafts: Vec<BadgeDraft>) -> Result<Vec<Badge>, ValidationError> {
        drafts
            .into_iter()
            .map(|d| self.badges.create(d))
            .collect()
    }
}

fn append_names(badges: &mut Vec<String>, names: &[String]) {
    for name in names {
        if !badges.contains(name) {
            badges.push(name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn module(id: &str, progress: u8, status: ModuleStatus, quiz: Option<u8>) -> Module {
        Module {
            id: id.into(),
            title: format!("Module {id}"),
            category: "general".into(),
            difficulty: Difficulty::Beginner,
            progress,
            completed_lessons: 0,
            lessons: 4,
            quiz_score: quiz,
            badges: Vec::new(),
            status,
        }
    }

    #[test]
    fn overall_progress_is_rounded_mean() {
        let modules = vec![
            module("m1", 100, ModuleStatus::Completed, None),
            module("m2", 50, ModuleStatus::InProgress, None),
        ];
        assert_eq!(overall_progress(&modules), 75);

        let modules = vec![
            module("a", 33, ModuleStatus::InProgress, None),
            module("b", 34, ModuleStatus::InProgress, None),
        ];
        // 33.5 rounds half away from zero.
        assert_eq!(overall_progress(&modules), 34);
    }

    #[test]
    fn empty_inputs_yield_zero() {
        assert_eq!(overall_progress(&[]), 0);
        assert_eq!(average_quiz_score(&[]), 0);
        assert_eq!(completed_modules(&[]), 0);
        let unscored = vec![module("m", 10, ModuleStatus::InProgress, None)];
        assert_eq!(average_quiz_score(&unscored), 0);
    }

    #[test]
    fn quiz_average_skips_unscored_modules() {
        let modules = vec![
            module("a", 0, ModuleStatus::NotStarted, None),
            module("b", 100, ModuleStatus::Completed, Some(80)),
            module("c", 100, ModuleStatus::Completed, Some(91)),
        ];
        assert_eq!(average_quiz_score(&modules), 86);
        assert_eq!(completed_modules(&modules), 2);
    }

    fn stores() -> (PersistentStore<Module>, PersistentStore<Badge>) {
        let storage = Arc::new(MemoryStorage::new());
        let mut m = module("m1", 75, ModuleStatus::InProgress, None);
        m.completed_lessons = 3;
        (
            PersistentStore::open(storage.clone(), "t", vec![m]),
            PersistentStore::open(storage, "t", vec![]),
        )
    }

    #[test]
    fn excellent_score_awards_pass_and_excellence_once() {
        let (mut modules, mut badges) = stores();
        let policy = Policy::default();
        let mut tracker = ProgressTracker::new(&mut modules, &mut badges, &policy);

        let first = tracker
            .record_quiz_result("m1", 95)
            .expect("valid")
            .expect("module exists");
        assert!(first.passed);
        assert_eq!(first.new_badges.len(), 2);

        let again = tracker
            .record_quiz_result("m1", 97)
            .expect("valid")
            .expect("module exists");
        assert!(again.new_badges.is_empty());

        assert_eq!(badges.len(), 2);
        let stored = modules.read("m1").expect("module");
        assert_eq!(stored.quiz_score, Some(97));
        assert_eq!(stored.badges.len(), 2);
    }

    #[test]
    fn failing_score_awards_nothing_and_keeps_best() {
        let (mut modules, mut badges) = stores();
        let policy = Policy::default();
        let mut tracker = ProgressTracker::new(&mut modules, &mut badges, &policy);

        tracker.record_quiz_result("m1", 72).expect("valid");
        let outcome = tracker
            .record_quiz_result("m1", 40)
            .expect("valid")
            .expect("module exists");
        assert!(!outcome.passed);
        assert!(outcome.new_badges.is_empty());
        assert_eq!(outcome.module.quiz_score, Some(72));
        assert_eq!(badges.len(), 1);
    }

    #[test]
    fn last_lesson_completes_module_and_awards_badge() {
        let (mut modules, mut badges) = stores();
        let policy = Policy::default();
        let mut tracker = ProgressTracker::new(&mut modules, &mut badges, &policy);

        let outcome = tracker
            .record_lesson_completed("m1")
            .expect("valid")
            .expect("module exists");
        assert!(outcome.newly_completed);
        assert_eq!(outcome.module.progress, 100);
        assert_eq!(outcome.module.status, ModuleStatus::Completed);
        assert_eq!(outcome.new_badges.len(), 1);
        assert_eq!(outcome.new_badges[0].rule, BadgeRule::ModuleCompleted);

        let repeat = tracker
            .record_lesson_completed("m1")
            .expect("valid")
            .expect("module exists");
        assert!(!repeat.newly_completed);
        assert_eq!(repeat.module.completed_lessons, 4);
        assert_eq!(badges.len(), 1);
    }

    #[test]
    fn unknown_module_and_bad_score() {
        let (mut modules, mut badges) = stores();
        let policy = Policy::default();
        let mut tracker = ProgressTracker::new(&mut modules, &mut badges, &policy);
        assert!(tracker.record_quiz_result("nope", 80).expect("valid").is_none());
        assert!(tracker.record_lesson_completed("nope").expect("valid").is_none());
        assert!(tracker.record_quiz_result("m1", 101).is_err());
    }
}

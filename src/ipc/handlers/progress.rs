use crate::ipc::error::{err, invalid, no_workspace, ok};
use crate::ipc::helpers::require_str;
use crate::ipc::types::{AppState, Request};
use crate::model::{Badge, NotificationDraft, NotificationType, Severity};
use crate::notifications::NotificationCenter;
use crate::progress::{self, ProgressTracker};
use serde_json::json;

fn handle_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(c) = state.collections.as_ref() else {
        return no_workspace(&req.id);
    };
    let summary = progress::summarize(c.modules.list(), c.badges.list());
    ok(&req.id, json!(summary))
}

fn handle_record_quiz(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(c) = state.collections.as_mut() else {
        return no_workspace(&req.id);
    };
    let module_id = match require_str(req, "moduleId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let score = match req.params.get("score").and_then(|v| v.as_u64()) {
        Some(v) if v <= 100 => v as u8,
        Some(v) => {
            return err(
                &req.id,
                "bad_params",
                format!("score must be between 0 and 100, got {v}"),
                None,
            )
        }
        None => return err(&req.id, "bad_params", "missing score", None),
    };

    let mut tracker = ProgressTracker::new(&mut c.modules, &mut c.badges, &state.config.policy);
    match tracker.record_quiz_result(module_id, score) {
        Ok(Some(outcome)) => {
            announce_badges(&mut NotificationCenter::new(&mut c.notifications), &outcome.new_badges);
            ok(&req.id, json!({ "found": true, "outcome": outcome }))
        }
        Ok(None) => ok(&req.id, json!({ "found": false })),
        Err(e) => invalid(&req.id, &e),
    }
}

fn handle_complete_lesson(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(c) = state.collections.as_mut() else {
        return no_workspace(&req.id);
    };
    let module_id = match require_str(req, "moduleId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let mut tracker = ProgressTracker::new(&mut c.modules, &mut c.badges, &state.config.policy);
    match tracker.record_lesson_completed(module_id) {
        Ok(Some(outcome)) => {
            announce_badges(&mut NotificationCenter::new(&mut c.notifications), &outcome.new_badges);
            ok(&req.id, json!({ "found": true, "outcome": outcome }))
        }
        Ok(None) => ok(&req.id, json!({ "found": false })),
        Err(e) => invalid(&req.id, &e),
    }
}

fn announce_badges(center: &mut NotificationCenter<'_>, badges: &[Badge]) {
    for badge in badges {
        let draft = NotificationDraft {
            kind: NotificationType::Achievement,
            severity: Severity::Low,
            title: "Badge earned".to_string(),
            message: format!("You earned the \"{}\" badge.", badge.name),
            timestamp: badge.earned_at,
            is_read: false,
            actions: Vec::new(),
        };
        if let Err(e) = center.push(draft) {
            tracing::warn!(badge = %badge.name, error = %e, "could not announce badge");
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "progress.summary" => Some(handle_summary(state, req)),
        "progress.recordQuiz" => Some(handle_record_quiz(state, req)),
        "progress.completeLesson" => Some(handle_complete_lesson(state, req)),
        _ => None,
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_text, Severity};
use crate::store::{Entity, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    Alert,
    Weather,
    Drill,
    Module,
    Achievement,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAction {
    pub label: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NotificationAction>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NotificationDraft {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub actions: Vec<NotificationAction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NotificationPatch {
    #[serde(rename = "type")]
    pub kind: Option<NotificationType>,
    pub severity: Option<Severity>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub is_read: Option<bool>,
    pub actions: Option<Vec<NotificationAction>>,
}

impl Entity for Notification {
    type Draft = NotificationDraft;
    type Patch = NotificationPatch;
    const COLLECTION: &'static str = "notifications";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, d: NotificationDraft) -> Self {
        Self {
            id,
            kind: d.kind,
            severity: d.severity,
            title: d.title,
            message: d.message,
            timestamp: d.timestamp,
            is_read: d.is_read,
            actions: d.actions,
        }
    }

    fn apply_patch(&mut self, p: NotificationPatch) {
        if let Some(v) = p.kind {
            self.kind = v;
        }
        if let Some(v) = p.severity {
            self.severity = v;
        }
        if let Some(v) = p.title {
            self.title = v;
        }
        if let Some(v) = p.message {
            self.message = v;
        }
        if let Some(v) = p.is_read {
            self.is_read = v;
        }
        if let Some(v) = p.actions {
            self.actions = v;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)
    }
}

//! Typed records for every collection the sidecar owns.
//!
//! Records serialize as camelCase JSON with kebab-case enum values, which is
//! the shape the UI reads from and writes to storage.

mod learning;
mod notification;
mod response;

pub use learning::{Badge, BadgeDraft, BadgePatch, BadgeRule, Difficulty, Module, ModuleDraft, ModulePatch, ModuleStatus};
pub use notification::{
    Notification, NotificationAction, NotificationDraft, NotificationPatch, NotificationType,
};
pub use response::{
    Activity, ActivityDraft, ActivityPatch, ActivityStatus, Incident, IncidentDraft,
    IncidentPatch, IncidentStatus, Personnel, PersonnelDraft, PersonnelPatch, PersonnelStatus,
    Resource, ResourceDraft, ResourcePatch,
};

use serde::{Deserialize, Serialize};

use crate::store::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

pub(crate) fn require_percent(field: &'static str, value: u8) -> Result<(), ValidationError> {
    if value > 100 {
        return Err(ValidationError::new(
            field,
            format!("must be between 0 and 100, got {value}"),
        ));
    }
    Ok(())
}

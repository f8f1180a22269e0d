use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_text, Severity};
use crate::store::{Entity, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncidentStatus {
    Active,
    Contained,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub responders: u32,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IncidentDraft {
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub severity: Severity,
    #[serde(default = "default_incident_status")]
    pub status: IncidentStatus,
    #[serde(default)]
    pub responders: u32,
    #[serde(default = "Utc::now")]
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

fn default_incident_status() -> IncidentStatus {
    IncidentStatus::Active
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IncidentPatch {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub location: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<IncidentStatus>,
    pub responders: Option<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Entity for Incident {
    type Draft = IncidentDraft;
    type Patch = IncidentPatch;
    const COLLECTION: &'static str = "incidents";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, d: IncidentDraft) -> Self {
        Self {
            id,
            kind: d.kind,
            location: d.location,
            severity: d.severity,
            status: d.status,
            responders: d.responders,
            started_at: d.started_at,
            resolved_at: d.resolved_at,
        }
    }

    fn apply_patch(&mut self, p: IncidentPatch) {
        if let Some(v) = p.kind {
            self.kind = v;
        }
        if let Some(v) = p.location {
            self.location = v;
        }
        if let Some(v) = p.severity {
            self.severity = v;
        }
        if let Some(v) = p.status {
            self.status = v;
        }
        if let Some(v) = p.responders {
            self.responders = v;
        }
        if let Some(v) = p.started_at {
            self.started_at = v;
        }
        if p.resolved_at.is_some() {
            self.resolved_at = p.resolved_at;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("type", &self.kind)?;
        require_text("location", &self.location)?;
        if let Some(resolved) = self.resolved_at {
            if resolved < self.started_at {
                return Err(ValidationError::new(
                    "resolvedAt",
                    "must not be earlier than startedAt",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersonnelStatus {
    OnDuty,
    Responding,
    OffDuty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personnel {
    pub id: String,
    pub name: String,
    pub role: String,
    pub status: PersonnelStatus,
    pub location: String,
    pub contact: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersonnelDraft {
    pub name: String,
    pub role: String,
    #[serde(default = "default_personnel_status")]
    pub status: PersonnelStatus,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub contact: String,
}

fn default_personnel_status() -> PersonnelStatus {
    PersonnelStatus::OffDuty
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersonnelPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub status: Option<PersonnelStatus>,
    pub location: Option<String>,
    pub contact: Option<String>,
}

impl Entity for Personnel {
    type Draft = PersonnelDraft;
    type Patch = PersonnelPatch;
    const COLLECTION: &'static str = "personnel";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, d: PersonnelDraft) -> Self {
        Self {
            id,
            name: d.name,
            role: d.role,
            status: d.status,
            location: d.location,
            contact: d.contact,
        }
    }

    fn apply_patch(&mut self, p: PersonnelPatch) {
        if let Some(v) = p.name {
            self.name = v;
        }
        if let Some(v) = p.role {
            self.role = v;
        }
        if let Some(v) = p.status {
            self.status = v;
        }
        if let Some(v) = p.location {
            self.location = v;
        }
        if let Some(v) = p.contact {
            self.contact = v;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("role", &self.role)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub available: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResourceDraft {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    /// Defaults to the full quantity.
    #[serde(default)]
    pub available: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResourcePatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<u32>,
    pub available: Option<u32>,
}

impl Entity for Resource {
    type Draft = ResourceDraft;
    type Patch = ResourcePatch;
    const COLLECTION: &'static str = "resources";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, d: ResourceDraft) -> Self {
        Self {
            id,
            name: d.name,
            category: d.category,
            quantity: d.quantity,
            available: d.available.unwrap_or(d.quantity),
        }
    }

    fn apply_patch(&mut self, p: ResourcePatch) {
        if let Some(v) = p.name {
            self.name = v;
        }
        if let Some(v) = p.category {
            self.category = v;
        }
        if let Some(v) = p.quantity {
            self.quantity = v;
        }
        if let Some(v) = p.available {
            self.available = v;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("category", &self.category)?;
        if self.available > self.quantity {
            return Err(ValidationError::new(
                "available",
                format!(
                    "available ({}) exceeds quantity ({})",
                    self.available, self.quantity
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub status: ActivityStatus,
    pub participants: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActivityDraft {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_activity_status")]
    pub status: ActivityStatus,
    #[serde(default)]
    pub participants: u32,
}

fn default_activity_status() -> ActivityStatus {
    ActivityStatus::Scheduled
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActivityPatch {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub status: Option<ActivityStatus>,
    pub participants: Option<u32>,
}

impl Entity for Activity {
    type Draft = ActivityDraft;
    type Patch = ActivityPatch;
    const COLLECTION: &'static str = "activities";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, d: ActivityDraft) -> Self {
        Self {
            id,
            kind: d.kind,
            title: d.title,
            timestamp: d.timestamp,
            status: d.status,
            participants: d.participants,
        }
    }

    fn apply_patch(&mut self, p: ActivityPatch) {
        if let Some(v) = p.kind {
            self.kind = v;
        }
        if let Some(v) = p.title {
            self.title = v;
        }
        if let Some(v) = p.timestamp {
            self.timestamp = v;
        }
        if let Some(v) = p.status {
            self.status = v;
        }
        if let Some(v) = p.participants {
            self.participants = v;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("type", &self.kind)?;
        require_text("title", &self.title)
    }
}

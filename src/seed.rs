//! Demo dataset used when a workspace has nothing stored yet, and restored by
//! `clear`.

use chrono::{DateTime, Utc};

use crate::model::{
    Activity, ActivityStatus, Badge, Difficulty, Incident, IncidentStatus, Module, ModuleStatus,
    Notification, NotificationAction, NotificationType, Personnel, PersonnelStatus, Resource,
    Severity,
};

#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub incidents: Vec<Incident>,
    pub personnel: Vec<Personnel>,
    pub resources: Vec<Resource>,
    pub activities: Vec<Activity>,
    pub modules: Vec<Module>,
    pub notifications: Vec<Notification>,
    pub badges: Vec<Badge>,
}

impl SeedData {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn demo() -> Self {
        Self {
            incidents: incidents(),
            personnel: personnel(),
            resources: resources(),
            activities: activities(),
            modules: modules(),
            notifications: notifications(),
            badges: Vec::new(),
        }
    }
}

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

// 2024-03-01T09:00:00Z
const BASE: i64 = 1_709_283_600;
const HOUR: i64 = 3_600;

pub fn incidents() -> Vec<Incident> {
    vec![
        Incident {
            id: "inc-001".into(),
            kind: "flood".into(),
            location: "Riverside District".into(),
            severity: Severity::High,
            status: IncidentStatus::Active,
            responders: 12,
            started_at: at(BASE),
            resolved_at: None,
        },
        Incident {
            id: "inc-002".into(),
            kind: "fire".into(),
            location: "North Campus, Building C".into(),
            severity: Severity::Critical,
            status: IncidentStatus::Contained,
            responders: 20,
            started_at: at(BASE - 5 * HOUR),
            resolved_at: None,
        },
        Incident {
            id: "inc-003".into(),
            kind: "earthquake".into(),
            location: "City Centre".into(),
            severity: Severity::Medium,
            status: IncidentStatus::Resolved,
            responders: 8,
            started_at: at(BASE - 48 * HOUR),
            resolved_at: Some(at(BASE - 40 * HOUR)),
        },
    ]
}

pub fn personnel() -> Vec<Personnel> {
    vec![
        Personnel {
            id: "per-001".into(),
            name: "A. Sharma".into(),
            role: "Incident Commander".into(),
            status: PersonnelStatus::Responding,
            location: "Riverside District".into(),
            contact: "+91-98100-00001".into(),
        },
        Personnel {
            id: "per-002".into(),
            name: "R. Iyer".into(),
            role: "Paramedic".into(),
            status: PersonnelStatus::OnDuty,
            location: "Central Station".into(),
            contact: "+91-98100-00002".into(),
        },
        Personnel {
            id: "per-003".into(),
            name: "K. Das".into(),
            role: "Search and Rescue".into(),
            status: PersonnelStatus::OffDuty,
            location: "Depot 4".into(),
            contact: "+91-98100-00003".into(),
        },
    ]
}

pub fn resources() -> Vec<Resource> {
    vec![
        Resource {
            id: "res-001".into(),
            name: "First aid kits".into(),
            category: "medical".into(),
            quantity: 150,
            available: 118,
        },
        Resource {
            id: "res-002".into(),
            name: "Drinking water (20L)".into(),
            category: "supplies".into(),
            quantity: 400,
            available: 260,
        },
        Resource {
            id: "res-003".into(),
            name: "Rescue boats".into(),
            category: "equipment".into(),
            quantity: 6,
            available: 2,
        },
        Resource {
            id: "res-004".into(),
            name: "Emergency shelters".into(),
            category: "shelter".into(),
            quantity: 12,
            available: 9,
        },
    ]
}

pub fn activities() -> Vec<Activity> {
    vec![
        Activity {
            id: "act-001".into(),
            kind: "drill".into(),
            title: "School-wide earthquake drill".into(),
            timestamp: at(BASE + 24 * HOUR),
            status: ActivityStatus::Scheduled,
            participants: 450,
        },
        Activity {
            id: "act-002".into(),
            kind: "training".into(),
            title: "First responder CPR refresher".into(),
            timestamp: at(BASE - 2 * HOUR),
            status: ActivityStatus::InProgress,
            participants: 24,
        },
        Activity {
            id: "act-003".into(),
            kind: "drill".into(),
            title: "Fire evacuation, Block B".into(),
            timestamp: at(BASE - 72 * HOUR),
            status: ActivityStatus::Completed,
            participants: 310,
        },
    ]
}

pub fn modules() -> Vec<Module> {
    vec![
        Module {
            id: "mod-earthquake".into(),
            title: "Earthquake Preparedness".into(),
            category: "earthquake".into(),
            difficulty: Difficulty::Beginner,
            progress: 100,
            completed_lessons: 5,
            lessons: 5,
            quiz_score: Some(92),
            badges: vec!["Earthquake Preparedness Complete".into()],
            status: ModuleStatus::Completed,
        },
        Module {
            id: "mod-flood".into(),
            title: "Flood Safety".into(),
            category: "flood".into(),
            difficulty: Difficulty::Beginner,
            progress: 60,
            completed_lessons: 3,
            lessons: 5,
            quiz_score: Some(75),
            badges: Vec::new(),
            status: ModuleStatus::InProgress,
        },
        Module {
            id: "mod-fire".into(),
            title: "Fire Safety and Evacuation".into(),
            category: "fire".into(),
            difficulty: Difficulty::Intermediate,
            progress: 0,
            completed_lessons: 0,
            lessons: 6,
            quiz_score: None,
            badges: Vec::new(),
            status: ModuleStatus::NotStarted,
        },
        Module {
            id: "mod-first-aid".into(),
            title: "First Aid Basics".into(),
            category: "first-aid".into(),
            difficulty: Difficulty::Advanced,
            progress: 25,
            completed_lessons: 2,
            lessons: 8,
            quiz_score: None,
            badges: Vec::new(),
            status: ModuleStatus::InProgress,
        },
    ]
}

pub fn notifications() -> Vec<Notification> {
    vec![
        Notification {
            id: "ntf-001".into(),
            kind: NotificationType::Alert,
            severity: Severity::Critical,
            title: "Flood warning issued".into(),
            message: "River levels rising in Riverside District. Move to higher ground.".into(),
            timestamp: at(BASE),
            is_read: false,
            actions: vec![NotificationAction {
                label: "View shelters".into(),
                action: "open-map".into(),
            }],
        },
        Notification {
            id: "ntf-002".into(),
            kind: NotificationType::Drill,
            severity: Severity::Medium,
            title: "Earthquake drill tomorrow".into(),
            message: "School-wide drill at 10:00. Review the drop, cover, hold procedure.".into(),
            timestamp: at(BASE - HOUR),
            is_read: false,
            actions: Vec::new(),
        },
        Notification {
            id: "ntf-003".into(),
            kind: NotificationType::Achievement,
            severity: Severity::Low,
            title: "Badge earned".into(),
            message: "You completed Earthquake Preparedness.".into(),
            timestamp: at(BASE - 30 * HOUR),
            is_read: true,
            actions: Vec::new(),
        },
        Notification {
            id: "ntf-004".into(),
            kind: NotificationType::Weather,
            severity: Severity::High,
            title: "Heavy rainfall expected".into(),
            message: "Up to 120mm of rain forecast over the next 24 hours.".into(),
            timestamp: at(BASE - 3 * HOUR),
            is_read: false,
            actions: Vec::new(),
        },
    ]
}

use chrono::{TimeZone, Utc};
use prepd::collections::Collections;
use prepd::model::{
    BadgeDraft, Incident, IncidentDraft, IncidentPatch, IncidentStatus, Resource, Severity,
};
use prepd::seed::{self, SeedData};
use prepd::storage::{KeyValueStorage, MemoryStorage, SqliteStorage};
use prepd::store::PersistentStore;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn flood_draft() -> IncidentDraft {
    serde_json::from_value(json!({
        "type": "flood",
        "location": "East Bank",
        "severity": "medium",
        "startedAt": "2024-03-02T06:00:00Z"
    }))
    .expect("draft")
}

#[test]
fn sqlite_backed_store_survives_reopen() {
    let workspace = temp_dir("prepd-store-sqlite");

    let created = {
        let storage: Arc<dyn KeyValueStorage> =
            Arc::new(SqliteStorage::open(&workspace, "prepd.sqlite3").expect("open sqlite"));
        let mut store: PersistentStore<Incident> =
            PersistentStore::open(storage, "prepd", seed::incidents());
        assert_eq!(store.len(), seed::incidents().len());
        let created = store.create(flood_draft()).expect("create");
        assert!(!store.is_degraded());
        created
    };

    let storage: Arc<dyn KeyValueStorage> =
        Arc::new(SqliteStorage::open(&workspace, "prepd.sqlite3").expect("reopen sqlite"));
    // A different seed proves the stored copy wins over seed data.
    let store: PersistentStore<Incident> = PersistentStore::open(storage, "prepd", Vec::new());
    assert_eq!(store.len(), seed::incidents().len() + 1);
    assert_eq!(store.read(&created.id), Some(&created));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn generated_ids_are_unique_and_ordering_is_insertion_order() {
    let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
    let mut store: PersistentStore<Incident> = PersistentStore::open(storage, "prepd", Vec::new());
    let a = store.create(flood_draft()).expect("a");
    let b = store.create(flood_draft()).expect("b");
    assert_ne!(a.id, b.id);
    let ids: Vec<&str> = store.list().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec![a.id.as_str(), b.id.as_str()]);
}

#[test]
fn update_merges_patch_and_rejects_invalid_result() {
    let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
    let mut store: PersistentStore<Incident> =
        PersistentStore::open(storage, "prepd", seed::incidents());

    let patch = IncidentPatch {
        status: Some(IncidentStatus::Resolved),
        resolved_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).single().expect("ts")),
        ..IncidentPatch::default()
    };
    let updated = store
        .update("inc-001", patch)
        .expect("valid patch")
        .expect("found");
    assert_eq!(updated.status, IncidentStatus::Resolved);
    assert_eq!(updated.location, "Riverside District");
    assert_eq!(updated.severity, Severity::High);

    let before = store.read("inc-001").cloned();
    let bad = IncidentPatch {
        resolved_at: Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single().expect("ts")),
        ..IncidentPatch::default()
    };
    let e = store.update("inc-001", bad).expect_err("resolved before start");
    assert_eq!(e.field, "resolvedAt");
    assert_eq!(store.read("inc-001").cloned(), before);

    assert!(store
        .update("inc-missing", IncidentPatch::default())
        .expect("no error")
        .is_none());
}

#[test]
fn failed_writes_keep_in_memory_changes_and_report_degraded() {
    let memory = Arc::new(MemoryStorage::new());
    let storage: Arc<dyn KeyValueStorage> = memory.clone();
    let mut store: PersistentStore<Incident> =
        PersistentStore::open(storage.clone(), "prepd", seed::incidents());

    memory.set_writes_disabled(true);
    let created = store.create(flood_draft()).expect("create still succeeds");
    assert!(store.is_degraded());
    assert!(store.read(&created.id).is_some());
    assert!(store.remove("inc-002"));
    assert!(store.read("inc-002").is_none());

    memory.set_writes_disabled(false);
    store.flush();
    assert!(!store.is_degraded());

    let reopened: PersistentStore<Incident> = PersistentStore::open(storage, "prepd", Vec::new());
    assert!(reopened.read(&created.id).is_some());
    assert!(reopened.read("inc-002").is_none());
}

#[test]
fn quota_exhaustion_is_a_degraded_write_not_an_error() {
    let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::with_quota(64));
    let mut store: PersistentStore<Resource> =
        PersistentStore::open(storage, "prepd", seed::resources());
    assert_eq!(store.len(), seed::resources().len());

    let draft = serde_json::from_value(json!({
        "name": "Water purification tablets",
        "category": "supplies",
        "quantity": 2000
    }))
    .expect("draft");
    let created = store.create(draft).expect("create");
    assert!(store.is_degraded());
    assert!(store
        .degraded_reason()
        .is_some_and(|r| r.contains("quota")));
    assert_eq!(store.read(&created.id).map(|r| r.available), Some(2000));
}

#[test]
fn unreadable_storage_falls_back_to_seed() {
    let memory = Arc::new(MemoryStorage::new());
    memory.set_reads_disabled(true);
    let storage: Arc<dyn KeyValueStorage> = memory.clone();
    let store: PersistentStore<Incident> =
        PersistentStore::open(storage, "prepd", seed::incidents());
    assert!(store.is_degraded());
    assert_eq!(store.list(), seed::incidents().as_slice());
}

#[test]
fn corrupt_or_partial_data_is_repaired_on_load() {
    let memory = Arc::new(MemoryStorage::new());
    let storage: Arc<dyn KeyValueStorage> = memory.clone();

    storage
        .set_item("prepd.incidents", "{not json")
        .expect("write garbage");
    let garbage: PersistentStore<Incident> =
        PersistentStore::open(storage.clone(), "prepd", seed::incidents());
    assert!(garbage.is_degraded());
    assert_eq!(garbage.len(), seed::incidents().len());

    let stored = json!([
        {
            "id": "inc-a",
            "type": "storm",
            "location": "Harbour",
            "severity": "low",
            "status": "active",
            "responders": 2,
            "startedAt": "2024-03-01T09:00:00Z"
        },
        { "id": "inc-a", "type": "storm", "location": "Copy", "severity": "low",
          "status": "active", "responders": 0, "startedAt": "2024-03-01T09:00:00Z" },
        { "id": "inc-b", "type": "", "location": "Blank type", "severity": "low",
          "status": "active", "responders": 0, "startedAt": "2024-03-01T09:00:00Z" },
        { "id": "inc-c", "severity": "extreme" }
    ]);
    storage
        .set_item("prepd.incidents", &stored.to_string())
        .expect("write records");
    let repaired: PersistentStore<Incident> =
        PersistentStore::open(storage, "prepd", seed::incidents());
    assert!(!repaired.is_degraded());
    assert_eq!(repaired.len(), 1);
    assert_eq!(
        repaired.read("inc-a").map(|i| i.location.as_str()),
        Some("Harbour")
    );
}

#[test]
fn clear_restores_seed_and_persists_it() {
    let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
    let mut store: PersistentStore<Incident> =
        PersistentStore::open(storage.clone(), "prepd", seed::incidents());
    store.create(flood_draft()).expect("create");
    assert!(store.remove("inc-001"));

    store.clear();
    assert_eq!(store.list(), seed::incidents().as_slice());

    let reopened: PersistentStore<Incident> = PersistentStore::open(storage, "prepd", Vec::new());
    assert_eq!(reopened.list(), seed::incidents().as_slice());
}

#[test]
fn first_badge_lands_in_an_empty_collection() {
    let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
    let mut collections = Collections::open(storage.clone(), "prepd", SeedData::demo());
    assert!(collections.badges.is_empty());

    let draft: BadgeDraft =
        serde_json::from_value(json!({ "title": "Quiz Master" })).expect("draft");
    let badge = collections.badges.create(draft).expect("create");
    assert!(!badge.id.is_empty());
    assert_eq!(badge.name, "Quiz Master");
    assert_eq!(collections.badges.len(), 1);
    assert_eq!(collections.badges.read(&badge.id), Some(&badge));

    let reopened = Collections::open(storage, "prepd", SeedData::demo());
    assert_eq!(reopened.badges.list(), std::slice::from_ref(&badge));
}

//! Generic CRUD over one named collection, mirrored in memory and persisted
//! as a JSON array through a [`KeyValueStorage`].
//!
//! Persistence is best-effort: a failed read falls back to the seed records
//! and a failed write is logged and leaves the in-memory change in place. In
//! both cases the store reports itself as degraded until the next successful
//! write.

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::storage::KeyValueStorage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A record kind that can live in a [`PersistentStore`].
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + 'static {
    /// Input for `create`: the record without its id.
    type Draft: DeserializeOwned;
    /// Input for `update`: every field optional, absent fields untouched.
    type Patch: DeserializeOwned + Default;

    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn from_draft(id: String, draft: Self::Draft) -> Self;
    fn apply_patch(&mut self, patch: Self::Patch);

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

pub fn storage_key(prefix: &str, collection: &str) -> String {
    if prefix.is_empty() {
        collection.to_string()
    } else {
        format!("{prefix}.{collection}")
    }
}

pub struct PersistentStore<T: Entity> {
    key: String,
    storage: Arc<dyn KeyValueStorage>,
    seed: Vec<T>,
    items: Vec<T>,
    degraded: Option<String>,
}

impl<T: Entity> PersistentStore<T> {
    /// Loads the collection from `storage`, or starts from `seed` when nothing
    /// usable is stored under the key.
    pub fn open(storage: Arc<dyn KeyValueStorage>, prefix: &str, seed: Vec<T>) -> Self {
        let mut store = Self {
            key: storage_key(prefix, T::COLLECTION),
            storage,
            seed,
            items: Vec::new(),
            degraded: None,
        };
        store.reload();
        store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn list(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        self.degraded.as_deref()
    }

    pub fn read(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn create(&mut self, draft: T::Draft) -> Result<T, ValidationError> {
        let item = T::from_draft(self.next_id(), draft);
        item.validate()?;
        self.items.push(item.clone());
        self.persist();
        Ok(item)
    }

    /// Merges `patch` into the record with `id`. Returns `Ok(None)` when no
    /// such record exists; a patch that leaves the record invalid is rejected
    /// and nothing changes.
    pub fn update(&mut self, id: &str, patch: T::Patch) -> Result<Option<T>, ValidationError> {
        self.modify(id, |item| item.apply_patch(patch))
    }

    pub(crate) fn modify(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut T),
    ) -> Result<Option<T>, ValidationError> {
        let Some(pos) = self.items.iter().position(|item| item.id() == id) else {
            return Ok(None);
        };
        let mut next = self.items[pos].clone();
        f(&mut next);
        next.validate()?;
        // Patches cannot carry an id, but closures could.
        if next.id() != id {
            return Err(ValidationError::new("id", "id is immutable"));
        }
        self.items[pos] = next.clone();
        self.persist();
        Ok(Some(next))
    }

    /// Applies `f` to every record and persists once if anything changed.
    /// `f` returns whether it changed the record.
    pub(crate) fn modify_all(&mut self, mut f: impl FnMut(&mut T) -> bool) -> usize {
        let mut changed = 0;
        for item in &mut self.items {
            if f(item) {
                changed += 1;
            }
        }
        if changed > 0 {
            self.persist();
        }
        changed
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        if self.items.len() == before {
            return false;
        }
        self.persist();
        true
    }

    pub fn clear(&mut self) {
        self.items = self.seed.clone();
        self.persist();
    }

    pub fn flush(&mut self) {
        self.persist();
    }

    /// Re-reads the backend, replacing the in-memory list.
    pub fn reload(&mut self) {
        match self.storage.get_item(&self.key) {
            Ok(None) => {
                self.items = self.seed.clone();
                self.degraded = None;
            }
            Ok(Some(raw)) => match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(value) => match self.decode_records(value) {
                    Some(items) => {
                        self.items = items;
                        self.degraded = None;
                    }
                    None => {
                        tracing::warn!(key = %self.key, "stored collection is not an array; using seed data");
                        self.items = self.seed.clone();
                        self.degraded = Some("corrupt data: not an array".to_string());
                    }
                },
                Err(e) => {
                    tracing::warn!(key = %self.key, error = %e, "stored collection is not valid JSON; using seed data");
                    self.items = self.seed.clone();
                    self.degraded = Some(format!("corrupt data: {e}"));
                }
            },
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "storage read failed; using seed data");
                self.items = self.seed.clone();
                self.degraded = Some(e.to_string());
            }
        }
    }

    /// Replaces the collection with records decoded from `value` (as found in
    /// a backup bundle) and persists them. Returns the number kept.
    pub fn restore(&mut self, value: serde_json::Value) -> usize {
        self.items = self.decode_records(value).unwrap_or_else(|| {
            tracing::warn!(key = %self.key, "restored collection is not an array; using seed data");
            self.seed.clone()
        });
        self.persist();
        self.items.len()
    }

    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(&self.items).unwrap_or_else(|_| serde_json::Value::Array(vec![]))
    }

    /// Keeps the decodable, valid, first-seen records. `None` when `value`
    /// is not an array at all.
    fn decode_records(&self, value: serde_json::Value) -> Option<Vec<T>> {
        let serde_json::Value::Array(raw_items) = value else {
            return None;
        };

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(raw_items.len());
        for raw in raw_items {
            let item: T = match serde_json::from_value(raw) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(key = %self.key, error = %e, "dropping undecodable record");
                    continue;
                }
            };
            if let Err(e) = item.validate() {
                tracing::warn!(key = %self.key, id = item.id(), error = %e, "dropping invalid record");
                continue;
            }
            if !seen.insert(item.id().to_string()) {
                tracing::warn!(key = %self.key, id = item.id(), "dropping record with duplicate id");
                continue;
            }
            items.push(item);
        }
        Some(items)
    }

    fn next_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.read(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&mut self) {
        let payload = match serde_json::to_string(&self.items) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "failed to serialize collection");
                self.degraded = Some(e.to_string());
                return;
            }
        };
        match self.storage.set_item(&self.key, &payload) {
            Ok(()) => self.degraded = None,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "failed to persist collection; keeping in-memory state");
                self.degraded = Some(e.to_string());
            }
        }
    }
}

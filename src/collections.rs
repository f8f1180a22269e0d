use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{Activity, Badge, Incident, Module, Notification, Personnel, Resource};
use crate::seed::SeedData;
use crate::storage::KeyValueStorage;
use crate::store::{Entity, PersistentStore};

pub const COLLECTION_NAMES: [&str; 7] = [
    Incident::COLLECTION,
    Personnel::COLLECTION,
    Resource::COLLECTION,
    Activity::COLLECTION,
    Module::COLLECTION,
    Notification::COLLECTION,
    Badge::COLLECTION,
];

/// Every typed collection, opened from one storage backend.
pub struct Collections {
    pub incidents: PersistentStore<Incident>,
    pub personnel: PersistentStore<Personnel>,
    pub resources: PersistentStore<Resource>,
    pub activities: PersistentStore<Activity>,
    pub modules: PersistentStore<Module>,
    pub notifications: PersistentStore<Notification>,
    pub badges: PersistentStore<Badge>,
}

impl Collections {
    pub fn open(storage: Arc<dyn KeyValueStorage>, prefix: &str, seed: SeedData) -> Self {
        let collections = Self {
            incidents: PersistentStore::open(storage.clone(), prefix, seed.incidents),
            personnel: PersistentStore::open(storage.clone(), prefix, seed.personnel),
            resources: PersistentStore::open(storage.clone(), prefix, seed.resources),
            activities: PersistentStore::open(storage.clone(), prefix, seed.activities),
            modules: PersistentStore::open(storage.clone(), prefix, seed.modules),
            notifications: PersistentStore::open(storage.clone(), prefix, seed.notifications),
            badges: PersistentStore::open(storage, prefix, seed.badges),
        };
        for (name, reason) in collections.degraded() {
            tracing::warn!(collection = name, reason = %reason, "collection opened without persistence");
        }
        collections
    }

    pub fn flush_all(&mut self) {
        self.incidents.flush();
        self.personnel.flush();
        self.resources.flush();
        self.activities.flush();
        self.modules.flush();
        self.notifications.flush();
        self.badges.flush();
    }

    pub fn reset_all(&mut self) {
        self.incidents.clear();
        self.personnel.clear();
        self.resources.clear();
        self.activities.clear();
        self.modules.clear();
        self.notifications.clear();
        self.badges.clear();
    }

    /// Collections currently running without working persistence.
    pub fn degraded(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        let mut check = |name: &'static str, reason: Option<&str>| {
            if let Some(r) = reason {
                out.push((name, r.to_string()));
            }
        };
        check(Incident::COLLECTION, self.incidents.degraded_reason());
        check(Personnel::COLLECTION, self.personnel.degraded_reason());
        check(Resource::COLLECTION, self.resources.degraded_reason());
        check(Activity::COLLECTION, self.activities.degraded_reason());
        check(Module::COLLECTION, self.modules.degraded_reason());
        check(Notification::COLLECTION, self.notifications.degraded_reason());
        check(Badge::COLLECTION, self.badges.degraded_reason());
        out
    }

    /// Current records of every collection, keyed by collection name.
    pub fn snapshot(&self) -> BTreeMap<String, serde_json::Value> {
        let mut out = BTreeMap::new();
        out.insert(Incident::COLLECTION.to_string(), self.incidents.snapshot());
        out.insert(Personnel::COLLECTION.to_string(), self.personnel.snapshot());
        out.insert(Resource::COLLECTION.to_string(), self.resources.snapshot());
        out.insert(Activity::COLLECTION.to_string(), self.activities.snapshot());
        out.insert(Module::COLLECTION.to_string(), self.modules.snapshot());
        out.insert(Notification::COLLECTION.to_string(), self.notifications.snapshot());
        out.insert(Badge::COLLECTION.to_string(), self.badges.snapshot());
        out
    }

    /// Replaces every collection named in `data`; others are left alone.
    /// Returns (collection, records kept) for each restored collection.
    pub fn restore(
        &mut self,
        mut data: BTreeMap<String, serde_json::Value>,
    ) -> Vec<(&'static str, usize)> {
        let mut restored = Vec::new();
        macro_rules! restore_one {
            ($field:ident, $ty:ty) => {
                if let Some(value) = data.remove(<$ty>::COLLECTION) {
                    restored.push((<$ty>::COLLECTION, self.$field.restore(value)));
                }
            };
        }
        restore_one!(incidents, Incident);
        restore_one!(personnel, Personnel);
        restore_one!(resources, Resource);
        restore_one!(activities, Activity);
        restore_one!(modules, Module);
        restore_one!(notifications, Notification);
        restore_one!(badges, Badge);
        for unknown in data.keys() {
            tracing::warn!(collection = %unknown, "ignoring unknown collection in restore");
        }
        restored
    }
}

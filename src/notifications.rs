use serde::{Deserialize, Serialize};

use crate::model::{Notification, NotificationDraft, NotificationType, Severity};
use crate::store::{PersistentStore, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadState {
    #[default]
    All,
    Unread,
    Read,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Newest,
    /// Most severe first, newest first within a severity.
    Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationFilter {
    #[serde(rename = "type")]
    pub kind: Option<NotificationType>,
    pub severity: Option<Severity>,
    pub read_state: ReadState,
    pub search: Option<String>,
    pub sort: SortOrder,
}

impl NotificationFilter {
    pub fn matches(&self, n: &Notification) -> bool {
        if self.kind.is_some_and(|k| k != n.kind) {
            return false;
        }
        if self.severity.is_some_and(|s| s != n.severity) {
            return false;
        }
        match self.read_state {
            ReadState::All => {}
            ReadState::Unread if n.is_read => return false,
            ReadState::Read if !n.is_read => return false,
            _ => {}
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                n.title.to_lowercase().contains(&needle) || n.message.to_lowercase().contains(&needle)
            }
        }
    }
}

/// Pure: returns the matching notifications in the requested order.
pub fn filter(items: &[Notification], criteria: &NotificationFilter) -> Vec<Notification> {
    let mut out: Vec<Notification> = items
        .iter()
        .filter(|n| criteria.matches(n))
        .cloned()
        .collect();
    match criteria.sort {
        SortOrder::Newest => out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        SortOrder::Severity => out.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        }),
    }
    out
}

pub fn unread_count(items: &[Notification]) -> usize {
    items.iter().filter(|n| !n.is_read).count()
}

/// Read-state mutations over the notification collection.
pub struct NotificationCenter<'a> {
    store: &'a mut PersistentStore<Notification>,
}

impl<'a> NotificationCenter<'a> {
    pub fn new(store: &'a mut PersistentStore<Notification>) -> Self {
        Self { store }
    }

    pub fn push(&mut self, mut draft: NotificationDraft) -> Result<Notification, ValidationError> {
        draft.is_read = false;
        let created = self.store.create(draft)?;
        tracing::debug!(id = %created.id, severity = created.severity.as_str(), "notification added");
        Ok(created)
    }

    /// Returns false when no notification has `id`.
    pub fn mark_as_read(&mut self, id: &str) -> bool {
        let Some(already_read) = self.store.read(id).map(|n| n.is_read) else {
            return false;
        };
        if already_read {
            return true;
        }
        match self.store.modify(id, |n| n.is_read = true) {
            Ok(updated) => updated.is_some(),
            Err(e) => {
                tracing::warn!(id, error = %e, "could not mark notification read");
                false
            }
        }
    }

    /// Returns how many notifications changed.
    pub fn mark_all_as_read(&mut self) -> usize {
        self.store.modify_all(|n| {
            if n.is_read {
                return false;
            }
            n.is_read = true;
            true
        })
    }

    pub fn dismiss(&mut self, id: &str) -> bool {
        self.store.remove(id)
    }

    pub fn unread_count(&self) -> usize {
        unread_count(self.store.list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn store() -> PersistentStore<Notification> {
        PersistentStore::open(Arc::new(MemoryStorage::new()), "t", seed::notifications())
    }

    fn only_severity(severity: Severity) -> NotificationFilter {
        NotificationFilter {
            severity: Some(severity),
            ..NotificationFilter::default()
        }
    }

    #[test]
    fn severity_filter_includes_and_excludes() {
        let items = seed::notifications();
        let critical = filter(&items, &only_severity(Severity::Critical));
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].id, "ntf-001");
        assert!(filter(&items, &only_severity(Severity::Low))
            .iter()
            .all(|n| n.id != "ntf-001"));
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_message() {
        let items = seed::notifications();
        let by_title = NotificationFilter {
            search: Some("FLOOD".into()),
            ..NotificationFilter::default()
        };
        assert_eq!(filter(&items, &by_title).len(), 1);

        let by_message = NotificationFilter {
            search: Some("drop, cover".into()),
            ..NotificationFilter::default()
        };
        let hits = filter(&items, &by_message);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "ntf-002");

        let blank = NotificationFilter {
            search: Some("   ".into()),
            ..NotificationFilter::default()
        };
        assert_eq!(filter(&items, &blank).len(), items.len());
    }

    #[test]
    fn read_state_and_sort_orders() {
        let items = seed::notifications();
        let unread = NotificationFilter {
            read_state: ReadState::Unread,
            ..NotificationFilter::default()
        };
        let ids: Vec<_> = filter(&items, &unread).into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["ntf-001", "ntf-002", "ntf-004"]);

        let by_severity = NotificationFilter {
            sort: SortOrder::Severity,
            ..NotificationFilter::default()
        };
        let ids: Vec<_> = filter(&items, &by_severity)
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec!["ntf-001", "ntf-004", "ntf-002", "ntf-003"]);
    }

    #[test]
    fn mark_all_as_read_is_idempotent() {
        let mut store = store();
        let mut center = NotificationCenter::new(&mut store);
        assert_eq!(center.unread_count(), 3);
        assert_eq!(center.mark_all_as_read(), 3);
        assert_eq!(center.unread_count(), 0);
        assert_eq!(center.mark_all_as_read(), 0);
        assert_eq!(center.unread_count(), 0);
    }

    #[test]
    fn mark_read_and_dismiss_single() {
        let mut store = store();
        let mut center = NotificationCenter::new(&mut store);
        assert!(center.mark_as_read("ntf-001"));
        assert!(center.mark_as_read("ntf-001"));
        assert!(!center.mark_as_read("missing"));
        assert_eq!(center.unread_count(), 2);

        assert!(center.dismiss("ntf-002"));
        assert!(!center.dismiss("ntf-002"));
        assert_eq!(center.unread_count(), 1);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn mark_read_reports_the_persisted_flip() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = PersistentStore::open(storage.clone(), "t", seed::notifications());
        assert!(NotificationCenter::new(&mut store).mark_as_read("ntf-004"));

        let reopened: PersistentStore<Notification> =
            PersistentStore::open(storage, "t", Vec::new());
        assert_eq!(reopened.read("ntf-004").map(|n| n.is_read), Some(true));
        assert_eq!(reopened.read("ntf-002").map(|n| n.is_read), Some(false));
    }
}

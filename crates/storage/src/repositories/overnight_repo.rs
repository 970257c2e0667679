use chrono::{DateTime, Utc};
use common::errors::StoreError;
use common::models::{OvernightAction, OvernightLog};

use crate::state_store::StateStore;

const FILE: &str = "overnight_actions.json";

/// Append-only log of significant overnight changes, consumed and reset by
/// the morning digest.
pub struct OvernightRepository;

impl OvernightRepository {
    pub fn load(store: &StateStore) -> Result<OvernightLog, StoreError> {
        store.read_json(FILE)
    }

    pub fn append(store: &StateStore, action: OvernightAction) -> Result<(), StoreError> {
        let mut log = Self::load(store)?;
        log.actions.push(action);
        store.write_json(FILE, &log)
    }

    /// Clears the log and stamps a new `last_reset`. The caller must have
    /// consumed (or explicitly discarded) the prior contents first.
    pub fn reset(store: &StateStore, now: DateTime<Utc>) -> Result<(), StoreError> {
        let log = OvernightLog {
            last_reset: now,
            actions: Vec::new(),
        };
        store.write_json(FILE, &log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(kind: &str) -> OvernightAction {
        OvernightAction {
            timestamp: Utc::now(),
            kind: kind.into(),
            details: "details".into(),
        }
    }

    #[test]
    fn appends_accumulate_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path()).unwrap();
        OvernightRepository::append(&store, action("first")).unwrap();
        OvernightRepository::append(&store, action("second")).unwrap();
        let log = OvernightRepository::load(&store).unwrap();
        assert_eq!(log.actions.len(), 2);
        assert_eq!(log.actions[0].kind, "first");
        assert_eq!(log.actions[1].kind, "second");
    }

    #[test]
    fn reset_clears_and_stamps() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path()).unwrap();
        OvernightRepository::append(&store, action("x")).unwrap();
        let stamp = Utc::now();
        OvernightRepository::reset(&store, stamp).unwrap();
        let log = OvernightRepository::load(&store).unwrap();
        assert!(log.actions.is_empty());
        assert_eq!(log.last_reset, stamp);
    }
}

use common::errors::StoreError;
use common::models::RecommendationSnapshot;

use crate::state_store::StateStore;

const FILE: &str = "last_recommendations.json";

/// The one persisted snapshot readers diff against. Overwritten whole on
/// every successful run.
pub struct SnapshotRepository;

impl SnapshotRepository {
    pub fn load(store: &StateStore) -> Result<RecommendationSnapshot, StoreError> {
        store.read_json(FILE)
    }

    pub fn save(store: &StateStore, snapshot: &RecommendationSnapshot) -> Result<(), StoreError> {
        store.write_json(FILE, snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::models::Session;

    #[test]
    fn load_on_fresh_store_is_empty_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path()).unwrap();
        let snap = SnapshotRepository::load(&store).unwrap();
        assert_eq!(snap.analyzed_count, 0);
        assert!(snap.buy_signals.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path()).unwrap();
        let mut snap = RecommendationSnapshot::empty(Utc::now(), Session::AfterHours);
        snap.analyzed_count = 42;
        SnapshotRepository::save(&store, &snap).unwrap();
        let back = SnapshotRepository::load(&store).unwrap();
        assert_eq!(back.analyzed_count, 42);
        assert_eq!(back.session, Session::AfterHours);
    }
}

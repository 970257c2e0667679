use chrono::{Duration, NaiveDate};
use common::errors::StoreError;
use common::models::SentAlertHistory;

use crate::state_store::StateStore;

const FILE: &str = "sent_alerts.json";

/// Dedup bookkeeping: which alert fingerprints already went out on which
/// market-local calendar date.
pub struct SentAlertsRepository;

impl SentAlertsRepository {
    pub fn load(store: &StateStore) -> Result<SentAlertHistory, StoreError> {
        store.read_json(FILE)
    }

    pub fn contains(
        store: &StateStore,
        date: NaiveDate,
        fingerprint: &str,
    ) -> Result<bool, StoreError> {
        Ok(Self::load(store)?.contains(date, fingerprint))
    }

    /// Records a fingerprint and prunes dates past the retention window in
    /// the same write.
    pub fn record(
        store: &StateStore,
        date: NaiveDate,
        fingerprint: String,
        retention_days: i64,
    ) -> Result<(), StoreError> {
        let mut history = Self::load(store)?;
        history.record(date, fingerprint);
        history.prune_before(date - Duration::days(retention_days));
        store.write_json(FILE, &history)
    }
}

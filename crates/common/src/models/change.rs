use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A score move of at least the configured jump threshold on a ticker present
/// in both snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreJump {
    pub ticker: String,
    pub previous: i32,
    pub current: i32,
}

/// Structured diff between the prior and current snapshot. `summary` is the
/// compact machine-readable form used for logs and subject lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeSet {
    pub added_buy: Vec<String>,
    pub removed_buy: Vec<String>,
    pub added_watch: Vec<String>,
    pub removed_watch: Vec<String>,
    /// watch -> buy
    pub promotions: Vec<String>,
    /// buy -> watch
    pub demotions: Vec<String>,
    pub score_upgrades: Vec<ScoreJump>,
    pub score_downgrades: Vec<ScoreJump>,
    pub is_significant: bool,
    pub summary: String,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added_buy.is_empty()
            && self.removed_buy.is_empty()
            && self.added_watch.is_empty()
            && self.removed_watch.is_empty()
            && self.promotions.is_empty()
            && self.demotions.is_empty()
            && self.score_upgrades.is_empty()
            && self.score_downgrades.is_empty()
    }

    /// Compact subject-line flags, e.g. `[UP,NEW]`.
    pub fn flags(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if !self.added_buy.is_empty() {
            out.push("NEW");
        }
        if !self.promotions.is_empty() {
            out.push("UP");
        }
        if !self.demotions.is_empty() {
            out.push("DOWN");
        }
        if !self.removed_buy.is_empty() {
            out.push("OUT");
        }
        out
    }
}

/// One consolidated entry in the overnight action log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvernightAction {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub details: String,
}

/// Append-only between the evening and morning cutoffs; reset exactly once by
/// the morning digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvernightLog {
    pub last_reset: DateTime<Utc>,
    pub actions: Vec<OvernightAction>,
}

impl Default for OvernightLog {
    fn default() -> Self {
        Self {
            last_reset: DateTime::<Utc>::MIN_UTC,
            actions: Vec::new(),
        }
    }
}

/// Calendar date (market timezone) to the set of alert fingerprints already
/// emitted that day. BTree containers keep serialization order canonical.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentAlertHistory {
    #[serde(flatten)]
    pub days: BTreeMap<NaiveDate, BTreeSet<String>>,
}

impl SentAlertHistory {
    pub fn contains(&self, date: NaiveDate, fingerprint: &str) -> bool {
        self.days
            .get(&date)
            .is_some_and(|set| set.contains(fingerprint))
    }

    pub fn record(&mut self, date: NaiveDate, fingerprint: String) {
        self.days.entry(date).or_default().insert(fingerprint);
    }

    /// Drops dates older than the retention window. History is otherwise
    /// monotonically non-decreasing.
    pub fn prune_before(&mut self, cutoff: NaiveDate) {
        self.days.retain(|date, _| *date >= cutoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_records_and_prunes() {
        let mut h = SentAlertHistory::default();
        let old = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let new = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        h.record(old, "abc".into());
        h.record(new, "def".into());
        assert!(h.contains(old, "abc"));
        h.prune_before(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert!(!h.contains(old, "abc"));
        assert!(h.contains(new, "def"));
    }

    #[test]
    fn flags_reflect_change_kinds() {
        let cs = ChangeSet {
            promotions: vec!["C".into()],
            ..Default::default()
        };
        assert_eq!(cs.flags(), vec!["UP"]);
    }
}

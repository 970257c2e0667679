//! Diff between the prior persisted snapshot and the current run, plus the
//! significance policy that gates notification.

use std::collections::BTreeMap;

use common::models::{ChangeSet, RecommendationSnapshot, ScoreJump, Signal};

/// Significance thresholds; configuration, not constants.
#[derive(Debug, Clone, Copy)]
pub struct ChangePolicy {
    /// Absolute score delta on a ticker persisted in both snapshots.
    pub score_jump: i32,
    /// WATCH adds + removes that count as significant on their own.
    pub watch_churn: usize,
}

impl Default for ChangePolicy {
    fn default() -> Self {
        Self {
            score_jump: 2,
            watch_churn: 3,
        }
    }
}

fn score_map(signals: &[Signal]) -> BTreeMap<&str, i32> {
    signals
        .iter()
        .map(|s| (s.ticker.symbol.as_str(), s.score))
        .collect()
}

/// Computes the full ChangeSet. Promotions and demotions are carved out of
/// the raw set differences so a watch->buy move is counted once.
pub fn diff(
    previous: &RecommendationSnapshot,
    current: &RecommendationSnapshot,
    policy: ChangePolicy,
) -> ChangeSet {
    let prev_buy = score_map(&previous.buy_signals);
    let prev_watch = score_map(&previous.watch_signals);
    let curr_buy = score_map(&current.buy_signals);
    let curr_watch = score_map(&current.watch_signals);

    let promotions: Vec<String> = curr_buy
        .keys()
        .filter(|t| prev_watch.contains_key(*t))
        .map(|t| t.to_string())
        .collect();
    let demotions: Vec<String> = curr_watch
        .keys()
        .filter(|t| prev_buy.contains_key(*t))
        .map(|t| t.to_string())
        .collect();

    let added_buy: Vec<String> = curr_buy
        .keys()
        .filter(|t| !prev_buy.contains_key(*t) && !prev_watch.contains_key(*t))
        .map(|t| t.to_string())
        .collect();
    let removed_buy: Vec<String> = prev_buy
        .keys()
        .filter(|t| !curr_buy.contains_key(*t) && !curr_watch.contains_key(*t))
        .map(|t| t.to_string())
        .collect();
    let added_watch: Vec<String> = curr_watch
        .keys()
        .filter(|t| !prev_watch.contains_key(*t) && !prev_buy.contains_key(*t))
        .map(|t| t.to_string())
        .collect();
    let removed_watch: Vec<String> = prev_watch
        .keys()
        .filter(|t| !curr_watch.contains_key(*t) && !curr_buy.contains_key(*t))
        .map(|t| t.to_string())
        .collect();

    // Score moves on tickers persisted in both snapshots.
    let mut prev_all = prev_buy.clone();
    prev_all.extend(prev_watch.iter().map(|(k, v)| (*k, *v)));
    let mut curr_all = curr_buy.clone();
    curr_all.extend(curr_watch.iter().map(|(k, v)| (*k, *v)));

    let mut score_upgrades = Vec::new();
    let mut score_downgrades = Vec::new();
    for (ticker, prev_score) in &prev_all {
        if let Some(curr_score) = curr_all.get(ticker) {
            let delta = curr_score - prev_score;
            let jump = ScoreJump {
                ticker: ticker.to_string(),
                previous: *prev_score,
                current: *curr_score,
            };
            if delta >= policy.score_jump {
                score_upgrades.push(jump);
            } else if delta <= -policy.score_jump {
                score_downgrades.push(jump);
            }
        }
    }

    let watch_churn = added_watch.len() + removed_watch.len();
    let is_significant = !added_buy.is_empty()
        || !removed_buy.is_empty()
        || !promotions.is_empty()
        || !demotions.is_empty()
        || !score_upgrades.is_empty()
        || !score_downgrades.is_empty()
        || watch_churn >= policy.watch_churn;

    let mut cs = ChangeSet {
        added_buy,
        removed_buy,
        added_watch,
        removed_watch,
        promotions,
        demotions,
        score_upgrades,
        score_downgrades,
        is_significant,
        summary: String::new(),
    };
    cs.summary = summarize(&cs);
    cs
}

/// Compact machine-readable summary, e.g. `+2 BUY, -1 BUY, +3 WATCH, 1 promotion`.
fn summarize(cs: &ChangeSet) -> String {
    let mut parts = Vec::new();
    if !cs.added_buy.is_empty() {
        parts.push(format!("+{} BUY", cs.added_buy.len()));
    }
    if !cs.removed_buy.is_empty() {
        parts.push(format!("-{} BUY", cs.removed_buy.len()));
    }
    if !cs.added_watch.is_empty() {
        parts.push(format!("+{} WATCH", cs.added_watch.len()));
    }
    if !cs.removed_watch.is_empty() {
        parts.push(format!("-{} WATCH", cs.removed_watch.len()));
    }
    push_count(&mut parts, cs.promotions.len(), "promotion", "promotions");
    push_count(&mut parts, cs.demotions.len(), "demotion", "demotions");
    push_count(&mut parts, cs.score_upgrades.len(), "upgrade", "upgrades");
    push_count(
        &mut parts,
        cs.score_downgrades.len(),
        "downgrade",
        "downgrades",
    );
    if parts.is_empty() {
        "no changes".to_string()
    } else {
        parts.join(", ")
    }
}

fn push_count(parts: &mut Vec<String>, n: usize, singular: &str, plural: &str) {
    match n {
        0 => {}
        1 => parts.push(format!("1 {singular}")),
        _ => parts.push(format!("{n} {plural}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::models::{
        IndicatorSet, Recommendation, SentimentReading, Session, Ticker,
    };

    fn sig(symbol: &str, score: i32) -> Signal {
        Signal {
            ticker: Ticker::new(symbol),
            current_price: 10.0,
            score,
            recommendation: Recommendation::from_score(score),
            indicators: IndicatorSet::default(),
            sentiment: SentimentReading::unknown(),
            signals: vec![],
        }
    }

    fn snapshot(buy: &[(&str, i32)], watch: &[(&str, i32)]) -> RecommendationSnapshot {
        let mut snap = RecommendationSnapshot::empty(Utc::now(), Session::RegularHours);
        snap.buy_signals = buy.iter().map(|(t, s)| sig(t, *s)).collect();
        snap.watch_signals = watch.iter().map(|(t, s)| sig(t, *s)).collect();
        snap.analyzed_count = snap.buy_signals.len() + snap.watch_signals.len();
        snap
    }

    #[test]
    fn identical_snapshots_are_not_significant() {
        let prev = snapshot(&[("A", 7), ("B", 6)], &[]);
        let curr = snapshot(&[("A", 7), ("B", 6)], &[]);
        let cs = diff(&prev, &curr, ChangePolicy::default());
        assert!(cs.is_empty());
        assert!(!cs.is_significant);
        assert_eq!(cs.summary, "no changes");
    }

    #[test]
    fn promotion_is_significant_and_not_double_counted() {
        let prev = snapshot(&[], &[("C", 4)]);
        let curr = snapshot(&[("C", 6)], &[]);
        let cs = diff(&prev, &curr, ChangePolicy::default());
        assert_eq!(cs.promotions, vec!["C"]);
        assert!(cs.added_buy.is_empty());
        assert!(cs.removed_watch.is_empty());
        assert!(cs.is_significant);
        assert!(cs.flags().contains(&"UP"));
    }

    #[test]
    fn buy_addition_is_significant() {
        let prev = snapshot(&[("A", 7)], &[]);
        let curr = snapshot(&[("A", 7), ("B", 6)], &[]);
        let cs = diff(&prev, &curr, ChangePolicy::default());
        assert_eq!(cs.added_buy, vec!["B"]);
        assert!(cs.is_significant);
        assert_eq!(cs.summary, "+1 BUY");
    }

    #[test]
    fn score_jump_on_persisted_ticker_is_significant() {
        let prev = snapshot(&[("A", 5)], &[]);
        let curr = snapshot(&[("A", 7)], &[]);
        let cs = diff(&prev, &curr, ChangePolicy::default());
        assert_eq!(cs.score_upgrades.len(), 1);
        assert_eq!(cs.score_upgrades[0].previous, 5);
        assert_eq!(cs.score_upgrades[0].current, 7);
        assert!(cs.is_significant);
    }

    #[test]
    fn small_watch_churn_is_not_significant() {
        let prev = snapshot(&[], &[("A", 3), ("B", 3)]);
        let curr = snapshot(&[], &[("A", 3), ("C", 3)]);
        // One add + one remove, score deltas below the jump threshold.
        let cs = diff(&prev, &curr, ChangePolicy::default());
        assert!(!cs.is_significant);
    }

    #[test]
    fn heavy_watch_churn_is_significant() {
        let prev = snapshot(&[], &[("A", 3)]);
        let curr = snapshot(&[], &[("B", 3), ("C", 3), ("D", 3)]);
        let cs = diff(&prev, &curr, ChangePolicy::default());
        assert!(cs.is_significant);
        assert_eq!(cs.summary, "+3 WATCH, -1 WATCH");
    }

    #[test]
    fn demotion_carves_out_of_watch_adds() {
        let prev = snapshot(&[("A", 6)], &[]);
        let curr = snapshot(&[], &[("A", 3)]);
        let cs = diff(&prev, &curr, ChangePolicy::default());
        assert_eq!(cs.demotions, vec!["A"]);
        assert!(cs.added_watch.is_empty());
        assert!(cs.removed_buy.is_empty());
        // A 6 -> 3 move also registers as a downgrade.
        assert_eq!(cs.score_downgrades.len(), 1);
    }
}

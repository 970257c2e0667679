use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signal::Signal;

/// Trading session in market-local (Eastern) time. Overnight is a derived
/// condition, not a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Session {
    Closed,
    PreMarket,
    RegularHours,
    AfterHours,
}

impl Session {
    pub fn as_str(&self) -> &'static str {
        match self {
            Session::Closed => "CLOSED",
            Session::PreMarket => "PRE_MARKET",
            Session::RegularHours => "REGULAR_HOURS",
            Session::AfterHours => "AFTER_HOURS",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Session::Closed => "🌙",
            Session::PreMarket => "🌅",
            Session::RegularHours => "📈",
            Session::AfterHours => "🌆",
        }
    }
}

/// The persisted record of one run: BUY and WATCH lists sorted by score desc
/// then ticker asc. Overwritten atomically after every successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSnapshot {
    pub timestamp: DateTime<Utc>,
    pub session: Session,
    pub analyzed_count: usize,
    pub buy_signals: Vec<Signal>,
    pub watch_signals: Vec<Signal>,
}

impl RecommendationSnapshot {
    pub fn empty(timestamp: DateTime<Utc>, session: Session) -> Self {
        Self {
            timestamp,
            session,
            analyzed_count: 0,
            buy_signals: Vec::new(),
            watch_signals: Vec::new(),
        }
    }

    /// Canonical list ordering: descending score, ticker ascending as the
    /// tie-break.
    pub fn sort_lists(&mut self) {
        let by_rank = |a: &Signal, b: &Signal| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.ticker.symbol.cmp(&b.ticker.symbol))
        };
        self.buy_signals.sort_by(by_rank);
        self.watch_signals.sort_by(by_rank);
    }
}

impl Default for RecommendationSnapshot {
    fn default() -> Self {
        Self::empty(DateTime::<Utc>::MIN_UTC, Session::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IndicatorSet, Recommendation, SentimentReading, Ticker};

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

    #[test]
    fn lists_sort_by_score_then_ticker() {
        let mut snap = RecommendationSnapshot::empty(Utc::now(), Session::RegularHours);
        snap.buy_signals = vec![sig("BBB", 6), sig("AAA", 6), sig("CCC", 9)];
        snap.sort_lists();
        let order: Vec<&str> = snap
            .buy_signals
            .iter()
            .map(|s| s.ticker.symbol.as_str())
            .collect();
        assert_eq!(order, vec!["CCC", "AAA", "BBB"]);
    }
}

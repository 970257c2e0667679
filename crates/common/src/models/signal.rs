use serde::{Deserialize, Serialize};

use super::bar::Ticker;
use super::indicators::IndicatorSet;
use super::sentiment::SentimentReading;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Watch,
    Hold,
    WeakSell,
    Sell,
    StrongSell,
    NoSignal,
}

impl Recommendation {
    /// Fixed score thresholds. The label is always derived from the rounded
    /// score; nothing else sets it.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 8 => Recommendation::StrongBuy,
            5..=7 => Recommendation::Buy,
            2..=4 => Recommendation::Watch,
            -1..=1 => Recommendation::Hold,
            -4..=-2 => Recommendation::WeakSell,
            -7..=-5 => Recommendation::Sell,
            _ => Recommendation::StrongSell,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "STRONG_BUY",
            Recommendation::Buy => "BUY",
            Recommendation::Watch => "WATCH",
            Recommendation::Hold => "HOLD",
            Recommendation::WeakSell => "WEAK_SELL",
            Recommendation::Sell => "SELL",
            Recommendation::StrongSell => "STRONG_SELL",
            Recommendation::NoSignal => "NO_SIGNAL",
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Recommendation::StrongBuy | Recommendation::Buy)
    }

    pub fn is_watch(&self) -> bool {
        matches!(self, Recommendation::Watch)
    }
}

/// The scored result for one ticker in one run. Built in a single pass and
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub ticker: Ticker,
    pub current_price: f64,
    pub score: i32,
    pub recommendation: Recommendation,
    pub indicators: IndicatorSet,
    pub sentiment: SentimentReading,
    /// Human-readable rule tags, in rule-table order.
    pub signals: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_bands_cover_all_scores() {
        assert_eq!(Recommendation::from_score(11), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_score(8), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_score(7), Recommendation::Buy);
        assert_eq!(Recommendation::from_score(5), Recommendation::Buy);
        assert_eq!(Recommendation::from_score(4), Recommendation::Watch);
        assert_eq!(Recommendation::from_score(2), Recommendation::Watch);
        assert_eq!(Recommendation::from_score(1), Recommendation::Hold);
        assert_eq!(Recommendation::from_score(0), Recommendation::Hold);
        assert_eq!(Recommendation::from_score(-1), Recommendation::Hold);
        assert_eq!(Recommendation::from_score(-2), Recommendation::WeakSell);
        assert_eq!(Recommendation::from_score(-4), Recommendation::WeakSell);
        assert_eq!(Recommendation::from_score(-5), Recommendation::Sell);
        assert_eq!(Recommendation::from_score(-7), Recommendation::Sell);
        assert_eq!(Recommendation::from_score(-8), Recommendation::StrongSell);
        assert_eq!(Recommendation::from_score(-20), Recommendation::StrongSell);
    }
}

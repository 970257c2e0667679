use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Market tag derived from the symbol suffix. Drives the overnight universe
/// subset (TSX names carry international exposure in our book).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    Us,
    Tsx,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub market: Market,
}

impl Ticker {
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        let market = match symbol.rsplit_once('.') {
            Some((_, "TO")) | Some((_, "V")) => Market::Tsx,
            Some(_) => Market::Other,
            None => Market::Us,
        };
        Self { symbol, market }
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bar {
    pub ts: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Daily bars for one ticker, ascending by timestamp. Per-run ephemera; never
/// persisted.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub ticker: Ticker,
    pub bars: Vec<Bar>,
}

impl PriceSeries {
    /// The shortest indicator window we compute needs this many bars.
    pub const MIN_BARS: usize = 20;

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last_close(&self) -> f64 {
        self.bars.last().map(|b| b.close).unwrap_or(0.0)
    }

    pub fn is_sorted_ascending(&self) -> bool {
        self.bars.windows(2).all(|w| w[0].ts <= w[1].ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_tag_from_suffix() {
        assert_eq!(Ticker::new("AAPL").market, Market::Us);
        assert_eq!(Ticker::new("SHOP.TO").market, Market::Tsx);
        assert_eq!(Ticker::new("WEED.V").market, Market::Tsx);
        assert_eq!(Ticker::new("BMW.DE").market, Market::Other);
    }
}

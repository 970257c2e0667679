//! Typed deserialization of the provider's chart payload and conversion into
//! a validated `PriceSeries`. Null entries (halted days) are skipped; a
//! result with fewer than the minimum usable bars is `fetch.malformed`.

use chrono::DateTime;
use serde::Deserialize;

use common::errors::FetchError;
use common::models::{Bar, PriceSeries, Ticker};

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    pub quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

impl ChartResponse {
    pub fn to_series(&self, ticker: &Ticker) -> Result<PriceSeries, FetchError> {
        if self.chart.error.is_some() {
            return Err(FetchError::NotFound);
        }
        let result = self
            .chart
            .result
            .as_ref()
            .and_then(|r| r.first())
            .ok_or(FetchError::NotFound)?;
        let quote = result
            .indicators
            .quote
            .first()
            .ok_or_else(|| FetchError::Malformed("missing quote block".into()))?;

        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
                value_at(&quote.open, i),
                value_at(&quote.high, i),
                value_at(&quote.low, i),
                value_at(&quote.close, i),
                value_at(&quote.volume, i),
            ) else {
                continue;
            };
            if !close.is_finite() || close <= 0.0 {
                continue;
            }
            let Some(ts) = DateTime::from_timestamp(ts, 0) else {
                continue;
            };
            bars.push(Bar {
                ts,
                open,
                high,
                low,
                close,
                volume,
            });
        }
        bars.sort_by_key(|b| b.ts);

        if bars.len() < PriceSeries::MIN_BARS {
            return Err(FetchError::Malformed(format!(
                "only {} usable bars for {}",
                bars.len(),
                ticker
            )));
        }
        Ok(PriceSeries {
            ticker: ticker.clone(),
            bars,
        })
    }
}

fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

/// News search payload; only headline titles are consumed.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
pub struct NewsItem {
    pub title: String,
}

//! HTTP implementation of `QuoteProvider` against a Yahoo-chart-shaped
//! endpoint. Status codes collapse into the closed fetch-error kinds; the
//! caller owns retry policy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use common::errors::FetchError;
use common::models::{PriceSeries, Ticker};

use crate::remote::chart_response::{ChartResponse, SearchResponse};
use crate::traits::QuoteProvider;

pub struct HttpQuoteClient {
    client: Client,
    base_url: String,
}

impl HttpQuoteClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("equity_alert_engine/0.1.0")
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client."),
            base_url: base_url.into(),
        }
    }

    fn classify_status(status: StatusCode) -> Option<FetchError> {
        match status {
            StatusCode::NOT_FOUND => Some(FetchError::NotFound),
            StatusCode::TOO_MANY_REQUESTS => Some(FetchError::Throttled),
            s if s.is_server_error() => {
                Some(FetchError::Transient(format!("HTTP {}", s.as_u16())))
            }
            s if s.is_success() => None,
            s => Some(FetchError::Transient(format!("unexpected HTTP {}", s.as_u16()))),
        }
    }

    fn classify_transport(e: reqwest::Error) -> FetchError {
        if e.is_decode() {
            FetchError::Malformed(e.to_string())
        } else {
            FetchError::Transient(e.to_string())
        }
    }
}

#[async_trait]
impl QuoteProvider for HttpQuoteClient {
    async fn daily_history(
        &self,
        ticker: &Ticker,
        window_days: u32,
    ) -> Result<PriceSeries, FetchError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker.symbol);
        let range = format!("{}d", window_days);
        let response = self
            .client
            .get(&url)
            .query(&[("interval", "1d"), ("range", range.as_str())])
            .send()
            .await
            .map_err(Self::classify_transport)?;

        if let Some(err) = Self::classify_status(response.status()) {
            return Err(err);
        }

        let parsed: ChartResponse = response.json().await.map_err(Self::classify_transport)?;
        let series = parsed.to_series(ticker)?;
        debug!("fetched {} bars for {}", series.len(), ticker);
        Ok(series)
    }

    async fn headlines(&self, ticker: &Ticker) -> Result<Vec<String>, FetchError> {
        let url = format!("{}/v1/finance/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", ticker.symbol.as_str()),
                ("newsCount", "10"),
                ("quotesCount", "0"),
            ])
            .send()
            .await
            .map_err(Self::classify_transport)?;

        if let Some(err) = Self::classify_status(response.status()) {
            return Err(err);
        }

        let parsed: SearchResponse = response.json().await.map_err(Self::classify_transport)?;
        Ok(parsed.news.into_iter().map(|n| n.title).collect())
    }
}

use async_trait::async_trait;

use common::errors::FetchError;
use common::models::{PriceSeries, Ticker};

/// Seam between the engine and any concrete quote/news provider. The engine
/// depends only on these two calls; a provider is a swap-in.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Daily OHLCV history covering up to `window_days` calendar days. Must
    /// yield at least `PriceSeries::MIN_BARS` usable bars or fail with
    /// `FetchError::Malformed`.
    async fn daily_history(
        &self,
        ticker: &Ticker,
        window_days: u32,
    ) -> Result<PriceSeries, FetchError>;

    /// Recent news headlines for the ticker. Callers treat any failure as
    /// "no sentiment input", never as a run failure.
    async fn headlines(&self, ticker: &Ticker) -> Result<Vec<String>, FetchError>;
}

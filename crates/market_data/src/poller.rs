//! Bounded-parallel fetch of the universe within one run. Workers only write
//! into a run-local results container; the merge back into universe order is
//! the single synchronization point.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{debug, warn};

use common::errors::FetchError;
use common::models::{PriceSeries, Ticker};

use crate::traits::QuoteProvider;

/// Maximum single backoff on a retryable failure.
const BACKOFF_CAP_SECS: u64 = 8;

/// Serializes request starts so consecutive requests against the provider
/// host are at least `interval` apart, regardless of pool width.
struct RateGate {
    next_slot: Mutex<Instant>,
    interval: Duration,
}

impl RateGate {
    fn new(interval: Duration) -> Self {
        Self {
            next_slot: Mutex::new(Instant::now()),
            interval,
        }
    }

    async fn pace(&self) {
        let at = {
            let mut slot = self.next_slot.lock().await;
            let at = (*slot).max(Instant::now());
            *slot = at + self.interval;
            at
        };
        sleep_until(at).await;
    }
}

pub struct UniversePoller {
    provider: Arc<dyn QuoteProvider>,
    concurrency: usize,
    gate: Arc<RateGate>,
    max_retries: u32,
}

impl UniversePoller {
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        concurrency: usize,
        request_delay_ms: u64,
        max_retries: u32,
    ) -> Self {
        Self {
            provider,
            concurrency: concurrency.max(1),
            gate: Arc::new(RateGate::new(Duration::from_millis(request_delay_ms))),
            max_retries,
        }
    }

    /// Fetches history for every ticker, preserving universe order in the
    /// output. Per-ticker failures stay per-ticker; the run never aborts.
    pub async fn fetch_universe(
        &self,
        tickers: &[Ticker],
        window_days: u32,
    ) -> Vec<(Ticker, Result<PriceSeries, FetchError>)> {
        let mut slots: Vec<Option<(Ticker, Result<PriceSeries, FetchError>)>> =
            (0..tickers.len()).map(|_| None).collect();

        let mut results = stream::iter(tickers.iter().cloned().enumerate())
            .map(|(idx, ticker)| {
                let provider = self.provider.clone();
                let gate = self.gate.clone();
                let retries = self.max_retries;
                async move {
                    let result =
                        Self::fetch_one(provider.as_ref(), &gate, &ticker, window_days, retries)
                            .await;
                    (idx, ticker, result)
                }
            })
            .buffer_unordered(self.concurrency);

        while let Some((idx, ticker, result)) = results.next().await {
            slots[idx] = Some((ticker, result));
        }
        drop(results);

        slots.into_iter().flatten().collect()
    }

    /// Fetches headlines for one ticker without retries; sentiment input is
    /// best-effort by design.
    pub async fn fetch_headlines(&self, ticker: &Ticker) -> Result<Vec<String>, FetchError> {
        self.gate.pace().await;
        self.provider.headlines(ticker).await
    }

    async fn fetch_one(
        provider: &dyn QuoteProvider,
        gate: &RateGate,
        ticker: &Ticker,
        window_days: u32,
        max_retries: u32,
    ) -> Result<PriceSeries, FetchError> {
        let mut attempt = 0u32;
        loop {
            gate.pace().await;
            match provider.daily_history(ticker, window_days).await {
                Ok(series) => return Ok(series),
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    attempt += 1;
                    let backoff = 2_u64.pow(attempt).min(BACKOFF_CAP_SECS);
                    warn!(
                        "{} for {}, backing off {}s (attempt {}/{})",
                        e.kind(),
                        ticker,
                        backoff,
                        attempt,
                        max_retries
                    );
                    sleep(Duration::from_secs(backoff)).await;
                }
                Err(e) => {
                    debug!("giving up on {}: {}", ticker, e.kind());
                    return Err(e);
                }
            }
        }
    }
}

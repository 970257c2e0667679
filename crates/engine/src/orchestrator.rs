//! The per-tick state machine: decide whether to run, analyze the universe,
//! diff against the persisted snapshot, route notifications, persist. One
//! cycle is a pure function of the wall clock plus stored state, so tests
//! drive `run_cycle` with pinned instants.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc, Weekday};
use tokio::time::{sleep, timeout};
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use common::config::Config;
use common::models::{ChangeSet, OvernightAction, OvernightLog, RecommendationSnapshot};
use market_data::{QuoteProvider, UniversePoller};
use storage::StateStore;
use storage::repositories::{OvernightRepository, SentAlertsRepository, SnapshotRepository};
use strategy::change_detector::{self, ChangePolicy};
use strategy::sentiment::{SentimentConfig, SentimentEngine};
use strategy::universe::UniverseProvider;
use strategy::{indicators, scorer};

use crate::clock::MarketClock;
use crate::notify::{self, AlertDispatcher};

pub struct Orchestrator {
    config: Config,
    clock: MarketClock,
    universe: UniverseProvider,
    poller: UniversePoller,
    sentiment: SentimentEngine,
    store: StateStore,
    dispatcher: AlertDispatcher,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        provider: Arc<dyn QuoteProvider>,
        store: StateStore,
        dispatcher: AlertDispatcher,
    ) -> Self {
        let clock = MarketClock::new(config.evening_cutoff_hour, config.morning_digest_hour);
        let universe = UniverseProvider::new(config.extended_hours_cap, config.overnight_cap);
        let poller = UniversePoller::new(
            provider,
            config.fetch_concurrency,
            config.request_delay_ms,
            config.fetch_retries,
        );
        let sentiment = SentimentEngine::new(SentimentConfig::from_env());
        Self {
            config,
            clock,
            universe,
            poller,
            sentiment,
            store,
            dispatcher,
        }
    }

    /// Ticks forever. Every cycle is bounded by its own error boundary; a
    /// failed cycle is logged and the next one starts on schedule.
    pub async fn run(&self) {
        loop {
            let run_id = Uuid::new_v4();
            let span = info_span!("run", id = %run_id);
            async {
                match self.clock.now_eastern() {
                    Some(now) => {
                        if let Err(e) = self.run_cycle(now).await {
                            error!("cycle failed: {:#}", e);
                        }
                    }
                    // Fail safe: an unresolvable clock is a CLOSED market.
                    None => warn!("clock.unknown: treating session as CLOSED"),
                }
            }
            .instrument(span)
            .await;
            sleep(Duration::from_secs(self.config.poll_interval_secs)).await;
        }
    }

    pub async fn run_cycle(&self, now: DateTime<FixedOffset>) -> anyhow::Result<()> {
        let overnight_log = OvernightRepository::load(&self.store)?;
        let digest_due = self
            .clock
            .is_morning_digest_due(now, overnight_log.actions.len());
        if !digest_due && !self.clock.should_run(now) {
            debug!("idle: outside run windows");
            return Ok(());
        }

        let snapshot = self.analyze(now).await?;
        let previous = SnapshotRepository::load(&self.store)?;
        let changes = change_detector::diff(
            &previous,
            &snapshot,
            ChangePolicy {
                score_jump: self.config.score_jump_threshold,
                watch_churn: self.config.watch_churn_threshold,
            },
        );
        info!(
            "analyzed {} tickers, {} BUY / {} WATCH | {}",
            snapshot.analyzed_count,
            snapshot.buy_signals.len(),
            snapshot.watch_signals.len(),
            changes.summary
        );

        if digest_due {
            self.send_digest(&overnight_log, &snapshot, &changes, now)
                .await;
        } else if changes.is_significant {
            if self.clock.is_overnight(now) {
                // Overnight changes wait for the morning digest.
                OvernightRepository::append(
                    &self.store,
                    OvernightAction {
                        timestamp: Utc::now(),
                        kind: "significant_change".into(),
                        details: changes.summary.clone(),
                    },
                )?;
                info!("overnight change logged for the morning digest");
            } else {
                self.send_alert(&snapshot, &changes, now).await;
            }
        }

        // A failed notification never blocks persistence; the next diff runs
        // against what was actually computed.
        SnapshotRepository::save(&self.store, &snapshot)?;
        Ok(())
    }

    /// Fetch, indicate, score. Per-ticker failures are skipped; the whole
    /// fetch runs under the network deadline.
    async fn analyze(
        &self,
        now: DateTime<FixedOffset>,
    ) -> anyhow::Result<RecommendationSnapshot> {
        let session = self.clock.session(now);
        let off_hours = self.clock.is_overnight(now)
            || matches!(now.weekday(), Weekday::Sat | Weekday::Sun);
        let tickers = self.universe.tickers_for(session, off_hours);
        if tickers.is_empty() {
            // An empty universe is a valid run: the empty snapshot flows
            // through diff and persist like any other.
            debug!("empty universe for {} (off_hours={})", session.as_str(), off_hours);
            return Ok(RecommendationSnapshot::empty(Utc::now(), session));
        }

        let deadline = Duration::from_secs(self.config.network_deadline_secs);
        let fetched = timeout(
            deadline,
            self.poller.fetch_universe(&tickers, self.config.window_days),
        )
        .await
        .map_err(|_| {
            anyhow!(
                "fetch.transient: universe fetch exceeded {}s deadline",
                self.config.network_deadline_secs
            )
        })?;

        let mut snapshot = RecommendationSnapshot::empty(Utc::now(), session);
        for (ticker, result) in fetched {
            match result {
                Ok(series) => {
                    let indicators = indicators::compute(&series);
                    let headlines = self.poller.fetch_headlines(&ticker).await.ok();
                    let reading = self.sentiment.read(headlines.as_deref(), &indicators);
                    let extras = self.universe.extras_for(&ticker, now.date_naive());
                    let signal =
                        scorer::score(ticker, series.last_close(), indicators, reading, extras);
                    snapshot.analyzed_count += 1;
                    if signal.recommendation.is_buy() {
                        snapshot.buy_signals.push(signal);
                    } else if signal.recommendation.is_watch() {
                        snapshot.watch_signals.push(signal);
                    }
                }
                Err(e) => {
                    warn!("{} for {}, skipping this run", e.kind(), ticker);
                }
            }
        }
        snapshot.sort_lists();
        Ok(snapshot)
    }

    async fn send_alert(
        &self,
        snapshot: &RecommendationSnapshot,
        changes: &ChangeSet,
        now: DateTime<FixedOffset>,
    ) {
        let date = now.date_naive();
        let fp = notify::fingerprint(snapshot, date);
        match SentAlertsRepository::contains(&self.store, date, &fp) {
            Ok(true) => {
                info!("duplicate alert suppressed");
                return;
            }
            Ok(false) => {}
            Err(e) => warn!("{}: {}", e.kind(), e),
        }

        let subject = notify::render_subject(snapshot.session, changes, now);
        let body = notify::render_body(snapshot, changes, now);
        let delivered = self.dispatcher.dispatch(&subject, &body).await;
        if delivered == 0 {
            warn!("notify.transient: no sink accepted the alert");
            return;
        }
        if let Err(e) =
            SentAlertsRepository::record(&self.store, date, fp, self.config.retention_days)
        {
            warn!("{}: {}", e.kind(), e);
        }
    }

    async fn send_digest(
        &self,
        log: &OvernightLog,
        snapshot: &RecommendationSnapshot,
        changes: &ChangeSet,
        now: DateTime<FixedOffset>,
    ) {
        let date = now.date_naive();
        let fp = format!("digest:{}", notify::fingerprint(snapshot, date));
        let already_sent = SentAlertsRepository::contains(&self.store, date, &fp)
            .unwrap_or_else(|e| {
                warn!("{}: {}", e.kind(), e);
                false
            });

        if !already_sent {
            let subject = format!(
                "☀️ Morning Digest - {} overnight entries ({:02}:{:02})",
                log.actions.len(),
                now.hour(),
                now.minute()
            );
            let body = notify::render_digest_body(log, snapshot, changes, now);
            let delivered = self.dispatcher.dispatch(&subject, &body).await;
            if delivered == 0 {
                // Log stays; the next tick inside the digest window retries.
                warn!("notify.transient: digest not delivered, keeping overnight log");
                return;
            }
            if let Err(e) =
                SentAlertsRepository::record(&self.store, date, fp, self.config.retention_days)
            {
                warn!("{}: {}", e.kind(), e);
            }
        }

        if let Err(e) = OvernightRepository::reset(&self.store, Utc::now()) {
            warn!("{}: {}", e.kind(), e);
        }
    }
}

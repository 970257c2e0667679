//! Alert rendering and fan-out. Rendering is pure so tests can assert on
//! exact output; `AlertDispatcher` owns the per-sink retry and deadline
//! policy and reports how many sinks accepted the message.

pub mod email;
pub mod telegram;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use sha2::{Digest, Sha256};
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use common::errors::NotifyError;
use common::models::{ChangeSet, OvernightLog, RecommendationSnapshot, Session, Signal};

pub use email::EmailSink;
pub use telegram::TelegramSink;

/// Attempts per sink beyond the first.
const SINK_RETRIES: u32 = 2;

#[async_trait]
pub trait AlertSink: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Content identity of an alert: the sorted (ticker, recommendation, score)
/// triples of both lists plus the market-local date. Two runs that agree on
/// these render the same alert, so one fingerprint suppresses the other.
pub fn fingerprint(snapshot: &RecommendationSnapshot, date: NaiveDate) -> String {
    let mut lines: Vec<String> = snapshot
        .buy_signals
        .iter()
        .chain(snapshot.watch_signals.iter())
        .map(|s| {
            format!(
                "{}|{}|{}",
                s.ticker.symbol,
                s.recommendation.as_str(),
                s.score
            )
        })
        .collect();
    lines.sort();

    let mut hasher = Sha256::new();
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    hex::encode(hasher.finalize())
}

pub fn render_subject(
    session: Session,
    changes: &ChangeSet,
    now: DateTime<FixedOffset>,
) -> String {
    let mut subject = format!(
        "{} {} Alert - {} ({:02}:{:02})",
        session.icon(),
        session.as_str(),
        changes.summary,
        now.hour(),
        now.minute()
    );
    let flags = changes.flags();
    if !flags.is_empty() {
        subject.push_str(&format!(" [{}]", flags.join(",")));
    }
    subject
}

pub fn render_body(
    snapshot: &RecommendationSnapshot,
    changes: &ChangeSet,
    now: DateTime<FixedOffset>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {} | {} | {} analyzed\n",
        snapshot.session.icon(),
        snapshot.session.as_str(),
        now.format("%Y-%m-%d %H:%M %Z"),
        snapshot.analyzed_count
    ));
    out.push_str(&format!("Changes: {}\n", changes.summary));

    if !changes.promotions.is_empty() {
        out.push_str(&format!("Promoted to BUY: {}\n", changes.promotions.join(", ")));
    }
    if !changes.demotions.is_empty() {
        out.push_str(&format!("Demoted to WATCH: {}\n", changes.demotions.join(", ")));
    }
    for jump in &changes.score_upgrades {
        out.push_str(&format!(
            "Score up {}: {} -> {}\n",
            jump.ticker, jump.previous, jump.current
        ));
    }
    for jump in &changes.score_downgrades {
        out.push_str(&format!(
            "Score down {}: {} -> {}\n",
            jump.ticker, jump.previous, jump.current
        ));
    }

    push_signal_section(&mut out, "BUY", &snapshot.buy_signals);
    push_signal_section(&mut out, "WATCH", &snapshot.watch_signals);
    out
}

/// Digest body: the consolidated overnight log first, then the current
/// snapshot rendered the usual way.
pub fn render_digest_body(
    log: &OvernightLog,
    snapshot: &RecommendationSnapshot,
    changes: &ChangeSet,
    now: DateTime<FixedOffset>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Overnight activity ({} entries since {}):\n",
        log.actions.len(),
        log.last_reset.format("%Y-%m-%d %H:%M UTC")
    ));
    for action in &log.actions {
        out.push_str(&format!(
            "  {} {} {}\n",
            action.timestamp.format("%H:%M"),
            action.kind,
            action.details
        ));
    }
    out.push('\n');
    out.push_str(&render_body(snapshot, changes, now));
    out
}

fn push_signal_section(out: &mut String, label: &str, signals: &[Signal]) {
    if signals.is_empty() {
        return;
    }
    out.push_str(&format!("\n{} ({}):\n", label, signals.len()));
    for s in signals {
        out.push_str(&format!(
            "  {:<8} {:>8.2}  score {:>3}  {}  [{}]\n",
            s.ticker.symbol,
            s.current_price,
            s.score,
            s.recommendation.as_str(),
            s.signals.join(", ")
        ));
    }
}

pub struct AlertDispatcher {
    sinks: Vec<Box<dyn AlertSink>>,
    sink_deadline: Duration,
}

impl AlertDispatcher {
    pub fn new(sinks: Vec<Box<dyn AlertSink>>, sink_deadline: Duration) -> Self {
        Self {
            sinks,
            sink_deadline,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Sends to every sink; a sink failure never stops the others. Returns
    /// the number of sinks that accepted the message.
    pub async fn dispatch(&self, subject: &str, body: &str) -> usize {
        let mut delivered = 0;
        for sink in &self.sinks {
            if self.send_with_retries(sink.as_ref(), subject, body).await {
                delivered += 1;
            }
        }
        delivered
    }

    async fn send_with_retries(&self, sink: &dyn AlertSink, subject: &str, body: &str) -> bool {
        for attempt in 0..=SINK_RETRIES {
            match timeout(self.sink_deadline, sink.send(subject, body)).await {
                Ok(Ok(())) => {
                    info!("alert delivered via {}", sink.name());
                    return true;
                }
                Ok(Err(e)) => {
                    warn!("{}: {} (attempt {})", e.kind(), e, attempt + 1);
                }
                Err(_) => {
                    warn!(
                        "notify.transient: sink {} deadline exceeded (attempt {})",
                        sink.name(),
                        attempt + 1
                    );
                }
            }
            if attempt < SINK_RETRIES {
                sleep(Duration::from_secs(u64::from(attempt) + 1)).await;
            }
        }
        false
    }
}

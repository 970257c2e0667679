use anyhow::Context;

/// Immutable runtime configuration, read once at startup and passed
/// explicitly. Every tunable the engine honors lives here; nothing reads the
/// environment after construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the three JSON state artifacts.
    pub data_dir: String,
    pub provider_base_url: String,

    /// Seconds between orchestrator wake-ups.
    pub poll_interval_secs: u64,
    /// Calendar days of daily history requested per ticker.
    pub window_days: u32,

    /// Bounded-parallelism cap for per-ticker fetches within a run.
    pub fetch_concurrency: usize,
    /// Minimum inter-request spacing against the provider host.
    pub request_delay_ms: u64,
    /// Retries per ticker per run on throttled/transient failures.
    pub fetch_retries: u32,

    /// Universe cap outside regular hours (pre/after market).
    pub extended_hours_cap: usize,
    /// Universe cap for overnight and weekend probes.
    pub overnight_cap: usize,

    /// Hour (ET) after which significant changes go to the overnight log.
    pub evening_cutoff_hour: u32,
    /// Hour (ET) at which the consolidated morning digest fires.
    pub morning_digest_hour: u32,

    /// Score delta on a persisted ticker that counts as significant.
    pub score_jump_threshold: i32,
    /// WATCH-list adds+removes that count as significant.
    pub watch_churn_threshold: usize,

    /// Days of sent-alert history kept before pruning.
    pub retention_days: i64,

    /// Wall-clock budget for the network-bound analyze phase of a tick.
    pub network_deadline_secs: u64,
    /// Wall-clock budget per notification sink dispatch.
    pub sink_deadline_secs: u64,

    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<i64>,
    pub mail_endpoint: Option<String>,
    pub mail_from: Option<String>,
    pub mail_to: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            data_dir: env_or("ALERTS_DATA_DIR", "data"),
            provider_base_url: env_or(
                "QUOTE_PROVIDER_BASE_URL",
                "https://query1.finance.yahoo.com",
            ),
            poll_interval_secs: env_parse("POLL_INTERVAL_SECS", 300)?,
            window_days: env_parse("HISTORY_WINDOW_DAYS", 320)?,
            fetch_concurrency: env_parse("FETCH_CONCURRENCY", 12)?,
            request_delay_ms: env_parse("REQUEST_DELAY_MS", 150)?,
            fetch_retries: env_parse("FETCH_RETRIES", 2)?,
            extended_hours_cap: env_parse("EXTENDED_HOURS_CAP", 400)?,
            overnight_cap: env_parse("OVERNIGHT_CAP", 200)?,
            evening_cutoff_hour: env_parse("EVENING_CUTOFF_HOUR", 20)?,
            morning_digest_hour: env_parse("MORNING_DIGEST_HOUR", 7)?,
            score_jump_threshold: env_parse("SCORE_JUMP_THRESHOLD", 2)?,
            watch_churn_threshold: env_parse("WATCH_CHURN_THRESHOLD", 3)?,
            retention_days: env_parse("ALERT_RETENTION_DAYS", 90)?,
            network_deadline_secs: env_parse("NETWORK_DEADLINE_SECS", 60)?,
            sink_deadline_secs: env_parse("SINK_DEADLINE_SECS", 30)?,
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN").ok(),
            telegram_chat_id: match std::env::var("TELEGRAM_CHAT_ID") {
                Ok(s) => Some(
                    s.parse::<i64>()
                        .context("TELEGRAM_CHAT_ID must be a number")?,
                ),
                Err(_) => None,
            },
            mail_endpoint: std::env::var("MAIL_GATEWAY_URL").ok(),
            mail_from: std::env::var("MAIL_FROM").ok(),
            mail_to: std::env::var("MAIL_TO").ok(),
        })
    }

    /// At least one sink must be configured or the process has no reason to
    /// exist; checked once at startup.
    pub fn require_any_sink(&self) -> anyhow::Result<()> {
        let has_telegram = self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some();
        let has_mail =
            self.mail_endpoint.is_some() && self.mail_from.is_some() && self.mail_to.is_some();
        anyhow::ensure!(
            has_telegram || has_mail,
            "no notification sink configured: set TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID \
             or MAIL_GATEWAY_URL/MAIL_FROM/MAIL_TO"
        );
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(s) => s
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {s}")),
        Err(_) => Ok(default),
    }
}

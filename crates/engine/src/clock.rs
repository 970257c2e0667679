//! Market-session clock in Eastern wall-clock time. Everything here is a
//! pure function of an instant so tests can pin the clock; only
//! `now_eastern()` touches the system time.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use common::models::Session;

const EST_OFFSET_SECS: i32 = -5 * 3600;
const EDT_OFFSET_SECS: i32 = -4 * 3600;

/// Hour (ET) at which the weekend/international probe fires.
const WEEKEND_PROBE_HOUR: u32 = 11;

pub struct MarketClock {
    holidays: HashSet<NaiveDate>,
    evening_cutoff_hour: u32,
    morning_digest_hour: u32,
}

impl MarketClock {
    pub fn new(evening_cutoff_hour: u32, morning_digest_hour: u32) -> Self {
        Self {
            holidays: configured_holidays(),
            evening_cutoff_hour,
            morning_digest_hour,
        }
    }

    /// Current Eastern time, or `None` when the offset cannot be built; the
    /// caller fails safe by treating that as CLOSED.
    pub fn now_eastern(&self) -> Option<DateTime<FixedOffset>> {
        to_eastern(Utc::now())
    }

    /// Session boundaries: 4:00 / 9:30 / 16:00 / 20:00 ET.
    pub fn session(&self, now: DateTime<FixedOffset>) -> Session {
        let minutes = now.hour() * 60 + now.minute();
        match minutes {
            m if m < 4 * 60 => Session::Closed,
            m if m < 9 * 60 + 30 => Session::PreMarket,
            m if m < 16 * 60 => Session::RegularHours,
            m if m < 20 * 60 => Session::AfterHours,
            _ => Session::Closed,
        }
    }

    pub fn is_market_day(&self, now: DateTime<FixedOffset>) -> bool {
        let date = now.date_naive();
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }

    /// The overnight condition is derived, not a session: on or after the
    /// evening cutoff, or before the morning cutoff.
    pub fn is_overnight(&self, now: DateTime<FixedOffset>) -> bool {
        now.hour() >= self.evening_cutoff_hour || now.hour() < self.morning_digest_hour
    }

    fn is_weekend_probe(&self, now: DateTime<FixedOffset>) -> bool {
        matches!(now.weekday(), Weekday::Sat | Weekday::Sun)
            && now.hour() == WEEKEND_PROBE_HOUR
    }

    /// Analysis is due during any non-CLOSED session on a market day, during
    /// the overnight window (international names), and in the weekend probe
    /// slot.
    pub fn should_run(&self, now: DateTime<FixedOffset>) -> bool {
        if self.is_market_day(now) && self.session(now) != Session::Closed {
            return true;
        }
        self.is_overnight(now) || self.is_weekend_probe(now)
    }

    /// True within the morning-cutoff hour on a market day while an
    /// unconsumed overnight log exists. The digest reset plus the
    /// fingerprint/date dedup make it fire at most once per day.
    pub fn is_morning_digest_due(
        &self,
        now: DateTime<FixedOffset>,
        overnight_actions: usize,
    ) -> bool {
        self.is_market_day(now)
            && now.hour() == self.morning_digest_hour
            && overnight_actions > 0
    }
}

/// Converts UTC to Eastern using the explicit US DST rule: EDT from the
/// second Sunday of March 07:00 UTC to the first Sunday of November 06:00
/// UTC, EST otherwise.
pub fn to_eastern(utc: DateTime<Utc>) -> Option<DateTime<FixedOffset>> {
    let year = utc.year();
    let dst_start = Utc
        .from_local_datetime(&nth_weekday(year, 3, Weekday::Sun, 2)?.and_hms_opt(7, 0, 0)?)
        .single()?;
    let dst_end = Utc
        .from_local_datetime(&nth_weekday(year, 11, Weekday::Sun, 1)?.and_hms_opt(6, 0, 0)?)
        .single()?;

    let offset_secs = if utc >= dst_start && utc < dst_end {
        EDT_OFFSET_SECS
    } else {
        EST_OFFSET_SECS
    };
    Some(utc.with_timezone(&FixedOffset::east_opt(offset_secs)?))
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
    let mut date = NaiveDate::from_ymd_opt(year, month, 1)?;
    let mut seen = 0;
    loop {
        if date.weekday() == weekday {
            seen += 1;
            if seen == n {
                return Some(date);
            }
        }
        date = date.succ_opt()?;
        if date.month() != month {
            return None;
        }
    }
}

/// US and Canadian market holidays shipped with the binary, extendable via
/// MARKET_HOLIDAYS="YYYY-MM-DD,YYYY-MM-DD".
fn configured_holidays() -> HashSet<NaiveDate> {
    let fixed: &[(i32, u32, u32)] = &[
        // 2025
        (2025, 1, 1),
        (2025, 1, 20),
        (2025, 2, 17),
        (2025, 4, 18),
        (2025, 5, 26),
        (2025, 6, 19),
        (2025, 7, 1),
        (2025, 7, 4),
        (2025, 9, 1),
        (2025, 10, 13),
        (2025, 11, 27),
        (2025, 12, 25),
        (2025, 12, 26),
        // 2026
        (2026, 1, 1),
        (2026, 1, 19),
        (2026, 2, 16),
        (2026, 4, 3),
        (2026, 5, 25),
        (2026, 6, 19),
        (2026, 7, 1),
        (2026, 7, 3),
        (2026, 9, 7),
        (2026, 10, 12),
        (2026, 11, 26),
        (2026, 12, 25),
        // 2027
        (2027, 1, 1),
        (2027, 1, 18),
        (2027, 2, 15),
        (2027, 3, 26),
        (2027, 5, 31),
        (2027, 6, 18),
        (2027, 7, 1),
        (2027, 7, 5),
        (2027, 9, 6),
        (2027, 10, 11),
        (2027, 11, 25),
        (2027, 12, 24),
    ];

    let mut out: HashSet<NaiveDate> = fixed
        .iter()
        .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect();

    if let Ok(s) = std::env::var("MARKET_HOLIDAYS") {
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Ok(d) = NaiveDate::parse_from_str(part, "%Y-%m-%d") {
                out.insert(d);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn clock() -> MarketClock {
        MarketClock::new(20, 7)
    }

    fn eastern(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        // Build a UTC instant whose Eastern projection lands on the wanted
        // wall-clock time, then convert.
        for utc_h_offset in 4..=5 {
            let utc = Utc
                .with_ymd_and_hms(y, mo, d, 0, 0, 0)
                .unwrap()
                .checked_add_signed(Duration::hours(h as i64 + utc_h_offset))
                .unwrap()
                .checked_add_signed(Duration::minutes(mi as i64))
                .unwrap();
            let eastern = to_eastern(utc).unwrap();
            if eastern.hour() == h && eastern.minute() == mi && eastern.day() == d {
                return eastern;
            }
        }
        panic!("could not construct eastern time");
    }

    #[test]
    fn session_boundaries() {
        let c = clock();
        // 2026-08-26 is a Wednesday.
        assert_eq!(c.session(eastern(2026, 8, 26, 3, 59)), Session::Closed);
        assert_eq!(c.session(eastern(2026, 8, 26, 4, 0)), Session::PreMarket);
        assert_eq!(c.session(eastern(2026, 8, 26, 9, 29)), Session::PreMarket);
        assert_eq!(c.session(eastern(2026, 8, 26, 9, 30)), Session::RegularHours);
        assert_eq!(c.session(eastern(2026, 8, 26, 15, 59)), Session::RegularHours);
        assert_eq!(c.session(eastern(2026, 8, 26, 16, 0)), Session::AfterHours);
        assert_eq!(c.session(eastern(2026, 8, 26, 19, 59)), Session::AfterHours);
        assert_eq!(c.session(eastern(2026, 8, 26, 20, 0)), Session::Closed);
    }

    #[test]
    fn dst_switch_changes_offset() {
        // 2026 DST starts March 8 and ends November 1.
        let winter = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap();
        assert_eq!(to_eastern(winter).unwrap().offset().local_minus_utc(), EST_OFFSET_SECS);
        assert_eq!(to_eastern(summer).unwrap().offset().local_minus_utc(), EDT_OFFSET_SECS);
    }

    #[test]
    fn weekends_and_holidays_are_not_market_days() {
        let c = clock();
        // Saturday
        assert!(!c.is_market_day(eastern(2026, 8, 29, 12, 0)));
        // US Thanksgiving 2026
        assert!(!c.is_market_day(eastern(2026, 11, 26, 12, 0)));
        // Plain Wednesday
        assert!(c.is_market_day(eastern(2026, 8, 26, 12, 0)));
    }

    #[test]
    fn overnight_window_spans_evening_and_early_morning() {
        let c = clock();
        assert!(c.is_overnight(eastern(2026, 8, 26, 20, 30)));
        assert!(c.is_overnight(eastern(2026, 8, 26, 22, 0)));
        assert!(c.is_overnight(eastern(2026, 8, 27, 5, 45)));
        assert!(!c.is_overnight(eastern(2026, 8, 26, 7, 0)));
        assert!(!c.is_overnight(eastern(2026, 8, 26, 12, 0)));
    }

    #[test]
    fn should_run_during_sessions_overnight_and_weekend_probe() {
        let c = clock();
        assert!(c.should_run(eastern(2026, 8, 26, 10, 0)));
        assert!(c.should_run(eastern(2026, 8, 26, 22, 0)));
        // Saturday probe slot only.
        assert!(c.should_run(eastern(2026, 8, 29, 11, 30)));
        assert!(!c.should_run(eastern(2026, 8, 29, 14, 0)));
        // Weekday mid-morning closed gap (7:00-9:30 is pre-market, runs).
        assert!(c.should_run(eastern(2026, 8, 26, 8, 0)));
    }

    #[test]
    fn digest_due_only_with_pending_actions_in_the_morning_hour() {
        let c = clock();
        assert!(c.is_morning_digest_due(eastern(2026, 8, 26, 7, 15), 3));
        assert!(!c.is_morning_digest_due(eastern(2026, 8, 26, 7, 15), 0));
        assert!(!c.is_morning_digest_due(eastern(2026, 8, 26, 8, 15), 3));
        // Saturday morning: hold the log until the next market day.
        assert!(!c.is_morning_digest_due(eastern(2026, 8, 29, 7, 15), 3));
    }
}

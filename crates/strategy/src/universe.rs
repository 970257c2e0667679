//! Static analysis universe, parametrized by trading session. The symbol list
//! ships with the binary; runtime mutation is not supported.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use common::models::{Market, Session, Ticker};

use crate::scorer::ScorerExtras;

/// Shipped universe, liquidity-ordered. The overnight subset is drawn from
/// the names with international exposure (TSX listings and the flagged ADRs).
const SYMBOLS: &[&str] = &[
    // Mega-cap tech
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "AVGO", "AMD", "CRM",
    "ORCL", "ADBE", "NFLX", "INTC", "QCOM", "TXN", "MU", "AMAT", "PLTR", "SNOW",
    // Financials
    "JPM", "BAC", "WFC", "GS", "MS", "C", "BLK", "SCHW", "AXP", "V",
    "MA", "PYPL", "COIN",
    // Healthcare
    "UNH", "JNJ", "LLY", "PFE", "MRK", "ABBV", "TMO", "ABT", "BMY", "AMGN",
    // Consumer
    "WMT", "COST", "HD", "MCD", "NKE", "SBUX", "TGT", "LOW", "DIS", "KO",
    "PEP", "PG",
    // Industrials & energy
    "CAT", "DE", "BA", "GE", "HON", "UPS", "XOM", "CVX", "COP", "SLB",
    "OXY", "FCX",
    // Communications & misc
    "T", "VZ", "CMCSA", "UBER", "ABNB", "SHOP", "SQ", "ROKU", "RIVN", "LCID",
    "F", "GM", "MARA", "RIOT", "MSTR", "SOFI", "HOOD", "DKNG", "CRWD", "NET",
    "DDOG", "ZS", "PANW", "SMCI", "ARM", "INTU", "NOW", "ISRG", "VRTX", "REGN",
    // TSX listings (international exposure)
    "SHOP.TO", "RY.TO", "TD.TO", "ENB.TO", "CNQ.TO", "BNS.TO", "BMO.TO", "CP.TO",
    "CNR.TO", "SU.TO", "TRI.TO", "BCE.TO", "ABX.TO", "WCN.TO", "MFC.TO",
];

/// US names with meaningful overseas books; eligible for the overnight probe
/// alongside the TSX listings.
const INTERNATIONAL_EXPOSURE: &[&str] = &[
    "AAPL", "MSFT", "NVDA", "TSLA", "AMD", "QCOM", "MU", "INTC", "XOM", "CVX",
    "CAT", "BA", "KO", "PEP", "MCD", "NKE", "V", "MA",
];

/// Theme membership feeding the scorer's hot-theme nudge.
const HOT_THEMES: &[(&str, &[&str])] = &[
    ("ai_infrastructure", &["NVDA", "AMD", "AVGO", "SMCI", "ARM", "MU", "VRT"]),
    ("crypto_adjacent", &["COIN", "MARA", "RIOT", "MSTR", "HOOD", "SQ"]),
    ("glp1", &["LLY", "NVO", "VKTX"]),
];

/// Days ahead within which a known earnings date counts as "soon".
const EARNINGS_WINDOW_DAYS: i64 = 7;

pub struct UniverseProvider {
    tickers: Vec<Ticker>,
    extended_hours_cap: usize,
    overnight_cap: usize,
    hot: HashSet<String>,
    /// Optional static earnings calendar, symbol -> next report date.
    earnings: HashMap<String, NaiveDate>,
}

impl UniverseProvider {
    pub fn new(extended_hours_cap: usize, overnight_cap: usize) -> Self {
        let mut seen = HashSet::new();
        let tickers: Vec<Ticker> = SYMBOLS
            .iter()
            .filter(|s| seen.insert(**s))
            .map(|s| Ticker::new(*s))
            .collect();

        let hot = HOT_THEMES
            .iter()
            .flat_map(|(_, members)| members.iter().map(|m| m.to_string()))
            .collect();

        let earnings = earnings_calendar_from_env();
        tracing::debug!(
            "universe loaded: {} symbols, {} earnings dates",
            tickers.len(),
            earnings.len()
        );

        Self {
            tickers,
            extended_hours_cap,
            overnight_cap,
            hot,
            earnings,
        }
    }

    /// Deduplicated ticker list for the current run. Regular hours get the
    /// full universe; extended hours the first K1; overnight/weekend the
    /// first K2 names with international exposure.
    pub fn tickers_for(&self, session: Session, overnight_or_weekend: bool) -> Vec<Ticker> {
        if overnight_or_weekend {
            return self
                .tickers
                .iter()
                .filter(|t| {
                    t.market == Market::Tsx || INTERNATIONAL_EXPOSURE.contains(&t.symbol.as_str())
                })
                .take(self.overnight_cap)
                .cloned()
                .collect();
        }
        match session {
            Session::RegularHours => self.tickers.clone(),
            Session::PreMarket | Session::AfterHours => self
                .tickers
                .iter()
                .take(self.extended_hours_cap)
                .cloned()
                .collect(),
            Session::Closed => Vec::new(),
        }
    }

    pub fn extras_for(&self, ticker: &Ticker, today: NaiveDate) -> ScorerExtras {
        let earnings_soon = self
            .earnings
            .get(&ticker.symbol)
            .map(|date| {
                let days = (*date - today).num_days();
                (0..=EARNINGS_WINDOW_DAYS).contains(&days)
            })
            .unwrap_or(false);
        ScorerExtras {
            earnings_soon,
            hot_theme: self.hot.contains(&ticker.symbol),
        }
    }
}

/// EARNINGS_CALENDAR="AAPL:2026-09-03,MSFT:2026-10-28". Unknown or malformed
/// entries are skipped.
fn earnings_calendar_from_env() -> HashMap<String, NaiveDate> {
    let mut out = HashMap::new();
    if let Ok(s) = std::env::var("EARNINGS_CALENDAR") {
        for part in s.split(',') {
            let part = part.trim();
            if let Some((symbol, date)) = part.split_once(':') {
                if let Ok(d) = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
                    out.insert(symbol.trim().to_uppercase(), d);
                }
            }
        }
    }
    out
}

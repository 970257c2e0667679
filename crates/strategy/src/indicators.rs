//! Pure numeric functions over a daily price series.
//!
//! Definitions are frozen: RSI uses Wilder smoothing over 14 bars, MACD is
//! EMA(12)-EMA(26) with an EMA(9) signal, Bollinger is 20-bar SMA +/- 2 sigma,
//! change windows are pinned at 1/5/8/21 bar offsets (1d/5d/1w/1m). Every
//! divisor is guarded; a zero denominator yields the documented neutral value
//! instead of an error.

use common::models::{IndicatorSet, PriceSeries};

const RSI_PERIOD: usize = 14;
const STOCH_PERIOD: usize = 14;
const ATR_PERIOD: usize = 14;
const BB_PERIOD: usize = 20;
const OBV_LOOKBACK: usize = 10;
const RANGE_PERIOD: usize = 20;

/// Computes the full indicator record for one series. The caller guarantees
/// at least `PriceSeries::MIN_BARS` bars; shorter moving averages fall back to
/// the available history.
pub fn compute(series: &PriceSeries) -> IndicatorSet {
    let closes = series.closes();
    let highs: Vec<f64> = series.bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = series.bars.iter().map(|b| b.low).collect();
    let volumes: Vec<f64> = series.bars.iter().map(|b| b.volume).collect();
    let close = *closes.last().unwrap_or(&0.0);

    let (macd_line, macd_signal, macd_hist) = macd(&closes);
    let (bb_upper, bb_lower, bb_width, bb_position) = bollinger(&closes);
    let (stoch_k, stoch_d) = stochastic(&highs, &lows, &closes);

    let set = IndicatorSet {
        rsi: rsi(&closes),
        macd_line,
        macd_signal,
        macd_hist,
        bb_upper,
        bb_lower,
        bb_width,
        bb_position,
        sma_5: sma_tail(&closes, 5),
        sma_10: sma_tail(&closes, 10),
        sma_20: sma_tail(&closes, 20),
        sma_50: sma_tail(&closes, 50),
        sma_200: sma_tail(&closes, 200),
        ema_12: ema_last(&closes, 12),
        ema_26: ema_last(&closes, 26),
        volume_ratio: volume_ratio(&volumes),
        stoch_k,
        stoch_d,
        williams_r: williams_r(&highs, &lows, close),
        atr_pct: atr_pct(&highs, &lows, &closes),
        obv_trend: obv_trend(&closes, &volumes),
        change_1d: pct_change(&closes, 1),
        change_5d: pct_change(&closes, 5),
        change_1w: pct_change(&closes, 8),
        change_1m: pct_change(&closes, 21),
        support: lows
            .iter()
            .rev()
            .take(RANGE_PERIOD)
            .copied()
            .fold(f64::INFINITY, f64::min),
        resistance: highs
            .iter()
            .rev()
            .take(RANGE_PERIOD)
            .copied()
            .fold(f64::NEG_INFINITY, f64::max),
    };
    set.sanitized()
}

/// Simple moving average over the trailing `period` values, or all available
/// values when history is short.
pub fn sma_tail(values: &[f64], period: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = period.min(values.len());
    values[values.len() - n..].iter().sum::<f64>() / n as f64
}

/// Full EMA series seeded with the SMA of the first `period` values. When the
/// input is shorter than `period` the seed is the first value.
fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());

    let seed_len = period.min(values.len());
    let seed = values[..seed_len].iter().sum::<f64>() / seed_len as f64;
    for (i, &v) in values.iter().enumerate() {
        if i < seed_len {
            out.push(seed);
        } else {
            let prev = out[i - 1];
            out.push(prev + alpha * (v - prev));
        }
    }
    out
}

pub fn ema_last(values: &[f64], period: usize) -> f64 {
    ema_series(values, period).last().copied().unwrap_or(0.0)
}

/// Wilder RSI. Returns 100 when the down-series sum is zero and the neutral
/// 50 when there is not enough history.
pub fn rsi(closes: &[f64]) -> f64 {
    if closes.len() <= RSI_PERIOD {
        return 50.0;
    }
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for w in closes[..=RSI_PERIOD].windows(2) {
        let delta = w[1] - w[0];
        if delta >= 0.0 {
            avg_gain += delta;
        } else {
            avg_loss -= delta;
        }
    }
    avg_gain /= RSI_PERIOD as f64;
    avg_loss /= RSI_PERIOD as f64;

    for w in closes[RSI_PERIOD..].windows(2) {
        let delta = w[1] - w[0];
        let (gain, loss) = if delta >= 0.0 {
            (delta, 0.0)
        } else {
            (0.0, -delta)
        };
        avg_gain = (avg_gain * (RSI_PERIOD as f64 - 1.0) + gain) / RSI_PERIOD as f64;
        avg_loss = (avg_loss * (RSI_PERIOD as f64 - 1.0) + loss) / RSI_PERIOD as f64;
    }

    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

/// (macd_line, signal, histogram) at the last bar.
pub fn macd(closes: &[f64]) -> (f64, f64, f64) {
    if closes.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let ema12 = ema_series(closes, 12);
    let ema26 = ema_series(closes, 26);
    let macd_series: Vec<f64> = ema12
        .iter()
        .zip(ema26.iter())
        .map(|(a, b)| a - b)
        .collect();
    let signal_series = ema_series(&macd_series, 9);
    let line = *macd_series.last().unwrap_or(&0.0);
    let signal = *signal_series.last().unwrap_or(&0.0);
    (line, signal, line - signal)
}

/// (upper, lower, width_pct, position_pct). Position is the neutral 50 when
/// the band collapses to zero width.
pub fn bollinger(closes: &[f64]) -> (f64, f64, f64, f64) {
    if closes.is_empty() {
        return (0.0, 0.0, 0.0, 50.0);
    }
    let n = BB_PERIOD.min(closes.len());
    let tail = &closes[closes.len() - n..];
    let mid = tail.iter().sum::<f64>() / n as f64;
    let var = tail.iter().map(|c| (c - mid).powi(2)).sum::<f64>() / n as f64;
    let sd = var.sqrt();
    let upper = mid + 2.0 * sd;
    let lower = mid - 2.0 * sd;

    let width = if mid != 0.0 {
        (upper - lower) / mid * 100.0
    } else {
        0.0
    };
    let close = *closes.last().unwrap();
    let position = if upper > lower {
        ((close - lower) / (upper - lower) * 100.0).clamp(0.0, 100.0)
    } else {
        50.0
    };
    (upper, lower, width, position)
}

/// Last-bar volume against the trailing 20-bar mean. Neutral 1.0 when volume
/// history is flat at zero.
pub fn volume_ratio(volumes: &[f64]) -> f64 {
    if volumes.is_empty() {
        return 1.0;
    }
    let n = 20usize.min(volumes.len());
    let mean = volumes[volumes.len() - n..].iter().sum::<f64>() / n as f64;
    if mean == 0.0 {
        return 1.0;
    }
    volumes[volumes.len() - 1] / mean
}

fn window_extremes(highs: &[f64], lows: &[f64], period: usize) -> (f64, f64) {
    let n = period.min(highs.len());
    let hh = highs[highs.len() - n..]
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let ll = lows[lows.len() - n..]
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    (hh, ll)
}

/// (%K, %D). %D is the SMA(3) of the last three %K values. Neutral 50/50 on a
/// flat 14-bar window.
pub fn stochastic(highs: &[f64], lows: &[f64], closes: &[f64]) -> (f64, f64) {
    if closes.is_empty() {
        return (50.0, 50.0);
    }
    let k_at = |end: usize| -> f64 {
        let h = &highs[..end];
        let l = &lows[..end];
        let (hh, ll) = window_extremes(h, l, STOCH_PERIOD);
        if hh > ll {
            (closes[end - 1] - ll) / (hh - ll) * 100.0
        } else {
            50.0
        }
    };
    let len = closes.len();
    let k = k_at(len);
    let mut d_sum = 0.0;
    let mut d_n = 0;
    for back in 0..3 {
        if len > back {
            d_sum += k_at(len - back);
            d_n += 1;
        }
    }
    (k, if d_n > 0 { d_sum / d_n as f64 } else { 50.0 })
}

/// Williams %R over 14 bars; neutral -50 on a flat window.
pub fn williams_r(highs: &[f64], lows: &[f64], close: f64) -> f64 {
    if highs.is_empty() {
        return -50.0;
    }
    let (hh, ll) = window_extremes(highs, lows, STOCH_PERIOD);
    if hh > ll {
        -100.0 * (hh - close) / (hh - ll)
    } else {
        -50.0
    }
}

/// 14-bar mean True Range as a percent of the last close; 0 when the close is
/// not positive.
pub fn atr_pct(highs: &[f64], lows: &[f64], closes: &[f64]) -> f64 {
    if closes.len() < 2 {
        return 0.0;
    }
    let mut trs = Vec::with_capacity(closes.len() - 1);
    for i in 1..closes.len() {
        let prev_close = closes[i - 1];
        let tr = (highs[i] - lows[i])
            .max((highs[i] - prev_close).abs())
            .max((lows[i] - prev_close).abs());
        trs.push(tr);
    }
    let n = ATR_PERIOD.min(trs.len());
    let atr = trs[trs.len() - n..].iter().sum::<f64>() / n as f64;
    let close = closes[closes.len() - 1];
    if close > 0.0 { atr / close * 100.0 } else { 0.0 }
}

/// Sign of the OBV move over the last 10 bars: -1, 0 or 1.
pub fn obv_trend(closes: &[f64], volumes: &[f64]) -> f64 {
    if closes.len() <= OBV_LOOKBACK {
        return 0.0;
    }
    let mut obv = vec![0.0];
    for i in 1..closes.len() {
        let prev = obv[i - 1];
        let step = if closes[i] > closes[i - 1] {
            volumes[i]
        } else if closes[i] < closes[i - 1] {
            -volumes[i]
        } else {
            0.0
        };
        obv.push(prev + step);
    }
    let delta = obv[obv.len() - 1] - obv[obv.len() - 1 - OBV_LOOKBACK];
    if delta > 0.0 {
        1.0
    } else if delta < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Percent close return over `offset` bars; 0 when the reference close is
/// missing or zero.
pub fn pct_change(closes: &[f64], offset: usize) -> f64 {
    if closes.len() <= offset {
        return 0.0;
    }
    let base = closes[closes.len() - 1 - offset];
    if base == 0.0 {
        return 0.0;
    }
    (closes[closes.len() - 1] / base - 1.0) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use common::models::{Bar, Ticker};

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2026, 1, 5, 21, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                ts: start + Duration::days(i as i64),
                open: c,
                high: c * 1.01,
                low: c * 0.99,
                close: c,
                volume: 1_000_000.0,
            })
            .collect();
        PriceSeries {
            ticker: Ticker::new("TEST"),
            bars,
        }
    }

    #[test]
    fn sma_uses_available_history_when_short() {
        assert_eq!(sma_tail(&[10.0, 20.0, 30.0], 200), 20.0);
        assert_eq!(sma_tail(&[1.0, 2.0, 3.0, 4.0], 2), 3.5);
    }

    #[test]
    fn rsi_is_100_on_monotonic_rise() {
        let closes: Vec<f64> = (1..=40).map(|i| i as f64).collect();
        assert_eq!(rsi(&closes), 100.0);
    }

    #[test]
    fn rsi_is_low_on_monotonic_fall() {
        let closes: Vec<f64> = (1..=40).rev().map(|i| i as f64).collect();
        assert!(rsi(&closes) < 5.0);
    }

    #[test]
    fn rsi_neutral_when_history_too_short() {
        assert_eq!(rsi(&[1.0, 2.0, 3.0]), 50.0);
    }

    #[test]
    fn pct_change_offsets() {
        let closes = vec![100.0; 21]
            .into_iter()
            .chain([110.0])
            .collect::<Vec<_>>();
        assert!((pct_change(&closes, 1) - 10.0).abs() < 1e-9);
        assert!((pct_change(&closes, 21) - 10.0).abs() < 1e-9);
        assert_eq!(pct_change(&closes, 30), 0.0);
    }

    #[test]
    fn bollinger_collapses_to_neutral_on_flat_series() {
        let closes = vec![50.0; 30];
        let (upper, lower, width, position) = bollinger(&closes);
        assert_eq!(upper, lower);
        assert_eq!(width, 0.0);
        assert_eq!(position, 50.0);
    }

    #[test]
    fn stochastic_is_high_at_window_top() {
        let closes: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let highs = closes.clone();
        let lows: Vec<f64> = closes.iter().map(|c| c - 0.5).collect();
        let (k, d) = stochastic(&highs, &lows, &closes);
        assert!(k > 90.0);
        assert!(d > 85.0);
    }

    #[test]
    fn volume_ratio_guards_zero_mean() {
        assert_eq!(volume_ratio(&[0.0; 25]), 1.0);
        let mut vols = vec![100.0; 19];
        vols.push(200.0);
        assert!(volume_ratio(&vols) > 1.8);
    }

    #[test]
    fn compute_produces_finite_record() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        let set = compute(&series_from_closes(&closes));
        assert!(set.rsi.is_finite());
        assert!(set.atr_pct >= 0.0);
        assert!(set.support <= set.resistance);
        assert!((0.0..=100.0).contains(&set.bb_position));
    }

    #[test]
    fn obv_trend_follows_price_direction() {
        let rising: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let falling: Vec<f64> = (1..=30).rev().map(|i| i as f64).collect();
        let vols = vec![1000.0; 30];
        assert_eq!(obv_trend(&rising, &vols), 1.0);
        assert_eq!(obv_trend(&falling, &vols), -1.0);
    }
}

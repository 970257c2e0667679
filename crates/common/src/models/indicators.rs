use serde::{Deserialize, Serialize};

/// One frozen indicator record per ticker per run. Field semantics and the
/// neutral fallbacks are fixed; the scorer assumes `sanitized()` has already
/// replaced any NaN with the neutral value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    /// Band width as percent of the middle band.
    pub bb_width: f64,
    /// Close position inside the band, 0..100.
    pub bb_position: f64,
    pub sma_5: f64,
    pub sma_10: f64,
    pub sma_20: f64,
    pub sma_50: f64,
    pub sma_200: f64,
    pub ema_12: f64,
    pub ema_26: f64,
    pub volume_ratio: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub williams_r: f64,
    pub atr_pct: f64,
    /// Sign of the 10-bar OBV move: -1, 0 or 1.
    pub obv_trend: f64,
    pub change_1d: f64,
    pub change_5d: f64,
    pub change_1w: f64,
    pub change_1m: f64,
    pub support: f64,
    pub resistance: f64,
}

impl Default for IndicatorSet {
    fn default() -> Self {
        Self {
            rsi: 50.0,
            macd_line: 0.0,
            macd_signal: 0.0,
            macd_hist: 0.0,
            bb_upper: 0.0,
            bb_lower: 0.0,
            bb_width: 0.0,
            bb_position: 50.0,
            sma_5: 0.0,
            sma_10: 0.0,
            sma_20: 0.0,
            sma_50: 0.0,
            sma_200: 0.0,
            ema_12: 0.0,
            ema_26: 0.0,
            volume_ratio: 1.0,
            stoch_k: 50.0,
            stoch_d: 50.0,
            williams_r: -50.0,
            atr_pct: 0.0,
            obv_trend: 0.0,
            change_1d: 0.0,
            change_5d: 0.0,
            change_1w: 0.0,
            change_1m: 0.0,
            support: 0.0,
            resistance: 0.0,
        }
    }
}

impl IndicatorSet {
    /// Replaces any NaN or infinite value with its neutral default so the
    /// scorer never sees a degenerate number.
    pub fn sanitized(mut self) -> Self {
        let neutral = Self::default();
        let pairs: [(&mut f64, f64); 27] = [
            (&mut self.rsi, neutral.rsi),
            (&mut self.macd_line, neutral.macd_line),
            (&mut self.macd_signal, neutral.macd_signal),
            (&mut self.macd_hist, neutral.macd_hist),
            (&mut self.bb_upper, neutral.bb_upper),
            (&mut self.bb_lower, neutral.bb_lower),
            (&mut self.bb_width, neutral.bb_width),
            (&mut self.bb_position, neutral.bb_position),
            (&mut self.sma_5, neutral.sma_5),
            (&mut self.sma_10, neutral.sma_10),
            (&mut self.sma_20, neutral.sma_20),
            (&mut self.sma_50, neutral.sma_50),
            (&mut self.sma_200, neutral.sma_200),
            (&mut self.ema_12, neutral.ema_12),
            (&mut self.ema_26, neutral.ema_26),
            (&mut self.volume_ratio, neutral.volume_ratio),
            (&mut self.stoch_k, neutral.stoch_k),
            (&mut self.stoch_d, neutral.stoch_d),
            (&mut self.williams_r, neutral.williams_r),
            (&mut self.atr_pct, neutral.atr_pct),
            (&mut self.obv_trend, neutral.obv_trend),
            (&mut self.change_1d, neutral.change_1d),
            (&mut self.change_5d, neutral.change_5d),
            (&mut self.change_1w, neutral.change_1w),
            (&mut self.change_1m, neutral.change_1m),
            (&mut self.support, neutral.support),
            (&mut self.resistance, neutral.resistance),
        ];
        for (field, fallback) in pairs {
            if !field.is_finite() {
                *field = fallback;
            }
        }
        self
    }
}

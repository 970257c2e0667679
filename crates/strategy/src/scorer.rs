//! Deterministic rule engine mapping indicators + sentiment to a score, a
//! recommendation label and the emitted rule tags. Weights are fixed; the
//! same inputs always produce the same signal.

use common::models::{
    IndicatorSet, Recommendation, SentimentCategory, SentimentReading, Signal, Ticker,
};

/// Per-ticker inputs that come from outside the price series.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScorerExtras {
    /// Earnings date within the universe's announced window.
    pub earnings_soon: bool,
    /// Ticker belongs to one of the configured hot themes.
    pub hot_theme: bool,
}

/// Builds the immutable signal for one ticker. `indicators` must already be
/// sanitized.
pub fn score(
    ticker: Ticker,
    current_price: f64,
    indicators: IndicatorSet,
    sentiment: SentimentReading,
    extras: ScorerExtras,
) -> Signal {
    let mut acc = 0.0_f64;
    let mut tags: Vec<String> = Vec::new();
    let hit = |delta: f64, tag: &str, acc: &mut f64, tags: &mut Vec<String>| {
        *acc += delta;
        tags.push(tag.to_string());
    };

    let ind = &indicators;

    // Daily move.
    if ind.change_1d >= 5.0 {
        hit(4.0, "daily_surge", &mut acc, &mut tags);
    } else if ind.change_1d <= -5.0 {
        hit(-4.0, "daily_drop", &mut acc, &mut tags);
    } else if ind.change_1d >= 2.0 {
        hit(2.0, "daily_gain", &mut acc, &mut tags);
    }

    if ind.change_5d >= 10.0 {
        hit(3.0, "strong_5d", &mut acc, &mut tags);
    }

    // Moving-average structure; the strongest stack wins, the 200-day check
    // is independent.
    let close = current_price;
    if close > ind.sma_5 && ind.sma_5 > ind.sma_10 && ind.sma_10 > ind.sma_20 && ind.sma_20 > ind.sma_50
    {
        hit(5.0, "ma_stack", &mut acc, &mut tags);
    } else if close > ind.sma_20 && ind.sma_20 > ind.sma_50 {
        hit(3.0, "above_key_mas", &mut acc, &mut tags);
    }
    if ind.sma_200 > 0.0 && close > ind.sma_200 {
        hit(1.0, "above_200", &mut acc, &mut tags);
    }

    // RSI bands.
    if ind.rsi < 20.0 {
        hit(5.0, "rsi_oversold_extreme", &mut acc, &mut tags);
    } else if ind.rsi < 30.0 {
        hit(3.0, "rsi_oversold", &mut acc, &mut tags);
    } else if ind.rsi <= 45.0 {
        hit(2.0, "rsi_cool", &mut acc, &mut tags);
    } else if ind.rsi > 80.0 {
        hit(-4.0, "rsi_overbought_extreme", &mut acc, &mut tags);
    } else if ind.rsi >= 70.0 {
        hit(-2.0, "rsi_overbought", &mut acc, &mut tags);
    }

    if ind.macd_line > ind.macd_signal && ind.macd_hist > 0.0 {
        hit(3.0, "macd_bull_x", &mut acc, &mut tags);
    }

    if ind.bb_position < 10.0 {
        hit(3.0, "bb_low", &mut acc, &mut tags);
    } else if ind.bb_position > 90.0 {
        hit(-3.0, "bb_high", &mut acc, &mut tags);
    }

    if ind.stoch_k < 20.0 && ind.stoch_d < 20.0 {
        hit(2.0, "stoch_oversold", &mut acc, &mut tags);
    } else if ind.stoch_k > 80.0 && ind.stoch_d > 80.0 {
        hit(-2.0, "stoch_overbought", &mut acc, &mut tags);
    }

    if ind.volume_ratio > 2.0 {
        hit(2.0, "volume_spike", &mut acc, &mut tags);
    } else if ind.volume_ratio > 1.5 {
        hit(1.0, "volume_elevated", &mut acc, &mut tags);
    } else if ind.volume_ratio < 0.5 {
        hit(-1.0, "volume_thin", &mut acc, &mut tags);
    }

    // Long-term crosses need a real 200-day average.
    if ind.sma_200 > 0.0 {
        if ind.sma_50 >= ind.sma_200 * 1.02 {
            hit(2.0, "golden_cross", &mut acc, &mut tags);
        } else if ind.sma_50 <= ind.sma_200 * 0.98 {
            hit(-2.0, "death_cross", &mut acc, &mut tags);
        }
    }

    match sentiment.category {
        SentimentCategory::Bullish => {
            hit(0.8 * sentiment.confidence, "sentiment_bull", &mut acc, &mut tags)
        }
        SentimentCategory::Bearish => {
            hit(-0.8 * sentiment.confidence, "sentiment_bear", &mut acc, &mut tags)
        }
        SentimentCategory::Neutral | SentimentCategory::Unknown => {}
    }

    if extras.earnings_soon {
        hit(0.15, "earnings_soon", &mut acc, &mut tags);
    }
    if extras.hot_theme {
        hit(0.10, "hot_theme", &mut acc, &mut tags);
    }

    let score = acc.round() as i32;
    Signal {
        ticker,
        current_price,
        score,
        recommendation: Recommendation::from_score(score),
        indicators,
        sentiment,
        signals: tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_indicators() -> IndicatorSet {
        IndicatorSet {
            rsi: 55.0,
            ..Default::default()
        }
    }

    #[test]
    fn oversold_surge_with_volume_is_strong_buy() {
        let ind = IndicatorSet {
            rsi: 15.0,
            change_1d: 6.0,
            volume_ratio: 2.3,
            ..base_indicators()
        };
        let sig = score(
            Ticker::new("NVDA"),
            120.0,
            ind,
            SentimentReading::unknown(),
            ScorerExtras::default(),
        );
        assert!(sig.score >= 8, "expected >= 8, got {}", sig.score);
        assert_eq!(sig.recommendation, Recommendation::StrongBuy);
        assert!(sig.signals.iter().any(|t| t == "daily_surge"));
        assert!(sig.signals.iter().any(|t| t == "rsi_oversold_extreme"));
        assert!(sig.signals.iter().any(|t| t == "volume_spike"));
    }

    #[test]
    fn neutral_inputs_are_hold() {
        let sig = score(
            Ticker::new("KO"),
            60.0,
            base_indicators(),
            SentimentReading::unknown(),
            ScorerExtras::default(),
        );
        assert_eq!(sig.score, 0);
        assert_eq!(sig.recommendation, Recommendation::Hold);
        assert!(sig.signals.is_empty());
    }

    #[test]
    fn label_band_always_contains_score() {
        for raw in -15..=15 {
            let ind = IndicatorSet {
                change_1d: raw as f64,
                ..base_indicators()
            };
            let sig = score(
                Ticker::new("T"),
                10.0,
                ind,
                SentimentReading::unknown(),
                ScorerExtras::default(),
            );
            assert_eq!(sig.recommendation, Recommendation::from_score(sig.score));
        }
    }

    #[test]
    fn sentiment_shifts_score_by_confidence() {
        let bullish = SentimentReading {
            composite: 0.5,
            category: SentimentCategory::Bullish,
            confidence: 1.0,
        };
        let ind = IndicatorSet {
            change_1d: 4.5, // +2 daily_gain, 2.5 + 0.8 rounds to 3
            ..base_indicators()
        };
        let with = score(
            Ticker::new("X"),
            10.0,
            ind,
            bullish,
            ScorerExtras::default(),
        );
        let without = score(
            Ticker::new("X"),
            10.0,
            ind,
            SentimentReading::unknown(),
            ScorerExtras::default(),
        );
        assert!(with.score >= without.score);
        assert!(with.signals.iter().any(|t| t == "sentiment_bull"));
    }

    #[test]
    fn scoring_is_deterministic() {
        let ind = IndicatorSet {
            rsi: 28.0,
            change_1d: 2.5,
            volume_ratio: 1.7,
            ..base_indicators()
        };
        let a = score(
            Ticker::new("AMD"),
            95.0,
            ind,
            SentimentReading::unknown(),
            ScorerExtras::default(),
        );
        let b = score(
            Ticker::new("AMD"),
            95.0,
            ind,
            SentimentReading::unknown(),
            ScorerExtras::default(),
        );
        assert_eq!(a.score, b.score);
        assert_eq!(a.signals, b.signals);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}

//! Cheap sentiment proxy: a lexicon scan over recent headlines combined with
//! a price/volume momentum term. No model, no network of its own; headline
//! fetch failures degrade the reading to `unknown` with zero confidence.

use common::models::{IndicatorSet, SentimentCategory, SentimentReading};

const DEFAULT_BULLISH: &[&str] = &[
    "beat", "beats", "surge", "soar", "rally", "upgrade", "record", "strong", "growth", "raise",
    "raises", "outperform", "breakout", "bullish", "buyback", "expands",
];
const DEFAULT_BEARISH: &[&str] = &[
    "miss", "misses", "plunge", "slump", "downgrade", "weak", "cut", "cuts", "lawsuit", "recall",
    "probe", "underperform", "bearish", "layoff", "layoffs", "warns",
];

/// Lexicon and combine weights. Compiled defaults, overridable from the
/// environment so tuning does not require a code change.
#[derive(Debug, Clone)]
pub struct SentimentConfig {
    pub bullish: Vec<String>,
    pub bearish: Vec<String>,
    pub lexicon_weight: f64,
    pub momentum_weight: f64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            bullish: DEFAULT_BULLISH.iter().map(|s| s.to_string()).collect(),
            bearish: DEFAULT_BEARISH.iter().map(|s| s.to_string()).collect(),
            lexicon_weight: 0.4,
            momentum_weight: 0.6,
        }
    }
}

impl SentimentConfig {
    pub fn from_env() -> Self {
        let mut out = Self::default();
        if let Ok(s) = std::env::var("SENTIMENT_BULLISH_WORDS") {
            out.bullish = split_words(&s);
        }
        if let Ok(s) = std::env::var("SENTIMENT_BEARISH_WORDS") {
            out.bearish = split_words(&s);
        }
        if let Ok(s) = std::env::var("SENTIMENT_LEXICON_WEIGHT") {
            if let Ok(w) = s.parse() {
                out.lexicon_weight = w;
            }
        }
        if let Ok(s) = std::env::var("SENTIMENT_MOMENTUM_WEIGHT") {
            if let Ok(w) = s.parse() {
                out.momentum_weight = w;
            }
        }
        out
    }
}

fn split_words(s: &str) -> Vec<String> {
    s.split(',')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

pub struct SentimentEngine {
    config: SentimentConfig,
}

impl SentimentEngine {
    pub fn new(config: SentimentConfig) -> Self {
        Self { config }
    }

    /// Combines the lexicon and momentum inputs. `headlines` is `None` when
    /// the news fetch failed; the reading then degrades to `unknown`.
    pub fn read(&self, headlines: Option<&[String]>, indicators: &IndicatorSet) -> SentimentReading {
        let Some(headlines) = headlines else {
            return SentimentReading::unknown();
        };

        let lexicon = self.lexicon_score(headlines);
        let momentum = momentum_proxy(indicators);
        let composite = (self.config.lexicon_weight * lexicon
            + self.config.momentum_weight * momentum)
            .clamp(-1.0, 1.0);

        let category = if composite > 0.05 {
            SentimentCategory::Bullish
        } else if composite < -0.05 {
            SentimentCategory::Bearish
        } else {
            SentimentCategory::Neutral
        };

        SentimentReading {
            composite,
            category,
            confidence: (10.0 * composite.abs()).min(1.0),
        }
    }

    /// (bull - bear) / max(1, bull + bear) over case-insensitive keyword hits.
    fn lexicon_score(&self, headlines: &[String]) -> f64 {
        let mut bull = 0i64;
        let mut bear = 0i64;
        for headline in headlines {
            let lower = headline.to_lowercase();
            bull += self
                .config
                .bullish
                .iter()
                .filter(|w| lower.contains(w.as_str()))
                .count() as i64;
            bear += self
                .config
                .bearish
                .iter()
                .filter(|w| lower.contains(w.as_str()))
                .count() as i64;
        }
        (bull - bear) as f64 / (bull + bear).max(1) as f64
    }
}

/// (volume_ratio - 1) * 0.3 + return_5d * 0.7, clipped to [-1, 1]. The 5-day
/// return enters as a fraction, not percent.
fn momentum_proxy(indicators: &IndicatorSet) -> f64 {
    ((indicators.volume_ratio - 1.0) * 0.3 + (indicators.change_5d / 100.0) * 0.7).clamp(-1.0, 1.0)
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentCategory {
    Bullish,
    Bearish,
    Neutral,
    Unknown,
}

/// Bounded sentiment scalar per ticker per run. Any failure on the way to a
/// reading degrades to `unknown` with zero confidence, which the scorer
/// treats as no adjustment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SentimentReading {
    /// Composite score in [-1, 1].
    pub composite: f64,
    pub category: SentimentCategory,
    /// Confidence in [0, 1].
    pub confidence: f64,
}

impl SentimentReading {
    pub fn unknown() -> Self {
        Self {
            composite: 0.0,
            category: SentimentCategory::Unknown,
            confidence: 0.0,
        }
    }
}

impl Default for SentimentReading {
    fn default() -> Self {
        Self::unknown()
    }
}

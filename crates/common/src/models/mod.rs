pub mod bar;
pub mod change;
pub mod indicators;
pub mod sentiment;
pub mod signal;
pub mod snapshot;

pub use bar::{Bar, Market, PriceSeries, Ticker};
pub use change::{ChangeSet, OvernightAction, OvernightLog, ScoreJump, SentAlertHistory};
pub use indicators::IndicatorSet;
pub use sentiment::{SentimentCategory, SentimentReading};
pub use signal::{Recommendation, Signal};
pub use snapshot::{RecommendationSnapshot, Session};

use thiserror::Error;

/// Failures produced by the market data adapter. Everything a provider can do
/// wrong collapses into this closed set; the orchestrator only ever branches
/// on the kind tag.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("symbol not found")]
    NotFound,
    #[error("provider rate limit hit")]
    Throttled,
    #[error("transient transport failure: {0}")]
    Transient(String),
    #[error("malformed or insufficient data: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::NotFound => "fetch.not_found",
            FetchError::Throttled => "fetch.throttled",
            FetchError::Transient(_) => "fetch.transient",
            FetchError::Malformed(_) => "fetch.malformed",
        }
    }

    /// Throttled and transient failures are worth another attempt; the other
    /// two will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Throttled | FetchError::Transient(_))
    }
}

/// Failures from the JSON state store. Missing or corrupt files are handled
/// inside the store (typed defaults); only real I/O faults surface here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state store I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("state store serialization failure: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        "store.io"
    }
}

/// Failures from a notification sink after its retry budget is exhausted.
#[derive(Debug, Error)]
#[error("sink {sink} failed: {message}")]
pub struct NotifyError {
    pub sink: &'static str,
    pub message: String,
}

impl NotifyError {
    pub fn kind(&self) -> &'static str {
        "notify.transient"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_kinds_are_stable() {
        assert_eq!(FetchError::NotFound.kind(), "fetch.not_found");
        assert_eq!(FetchError::Throttled.kind(), "fetch.throttled");
        assert_eq!(FetchError::Transient("x".into()).kind(), "fetch.transient");
        assert_eq!(FetchError::Malformed("x".into()).kind(), "fetch.malformed");
    }

    #[test]
    fn only_throttled_and_transient_retry() {
        assert!(FetchError::Throttled.is_retryable());
        assert!(FetchError::Transient("reset".into()).is_retryable());
        assert!(!FetchError::NotFound.is_retryable());
        assert!(!FetchError::Malformed("short".into()).is_retryable());
    }
}

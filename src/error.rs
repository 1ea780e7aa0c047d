use crate::models::Timeframe;
use thiserror::Error;

/// Failures reported by a market data gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Fetch failed for {symbol} {timeframe}: {reason}")]
    FetchFailed {
        symbol: String,
        timeframe: Timeframe,
        reason: String,
    },

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Failed to decode bars: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-timeframe failures inside one analysis cycle
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Data unavailable for {timeframe}: {reason}")]
    DataUnavailable { timeframe: Timeframe, reason: String },
}

/// Invalid construction-time configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Empty symbol")]
    EmptySymbol,

    #[error("Timeframe list is empty")]
    NoTimeframes,

    #[error("Cache TTL must be between 1s and one week, got {0}s")]
    InvalidTtl(u64),

    #[error("Minimum call delay must be positive and at most one hour, got {0}s")]
    InvalidCallDelay(f64),

    #[error("Lookback must be at least 2, got {0}")]
    InvalidLookback(usize),

    #[error("Bar count {bars} is below the analysis minimum of {min}")]
    TooFewBars { bars: usize, min: usize },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

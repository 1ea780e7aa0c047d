//! Analyzer configuration
//!
//! Layered as built-in defaults, then an optional TOML file, then
//! `GOLDBOT_*` environment variables (`GOLDBOT_TIMEFRAMES=M15,H1,H4`).

use crate::cache::MAX_TTL;
use crate::error::ConfigError;
use crate::models::Timeframe;
use config::{Config, Environment, File, Map};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const ENV_PREFIX: &str = "GOLDBOT";

/// Upper bound on `min_call_delay_secs`
pub const MAX_CALL_DELAY_SECS: f64 = 3600.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub symbol: String,
    pub timeframes: Vec<Timeframe>,
    /// Bars requested per fetch
    pub bars: usize,
    pub cache_ttl_secs: u64,
    /// Minimum gap between two gateway calls
    pub min_call_delay_secs: f64,
    /// Zone detection lookback window
    pub lookback: usize,
    /// Volume must exceed this multiple of the window mean to confirm a zone
    pub volume_multiplier: f64,
    /// Strength added by an engulfing pattern on the final bar
    pub pattern_boost: f64,
    pub poll_interval_secs: u64,
    pub error_backoff_secs: u64,
    /// Signals strictly above this strength are reported as strong
    pub strong_signal_threshold: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            symbol: "XAUUSD".to_string(),
            timeframes: vec![Timeframe::M15, Timeframe::H1, Timeframe::H4],
            bars: 100,
            cache_ttl_secs: 900,
            min_call_delay_secs: 1.0,
            lookback: 20,
            volume_multiplier: 1.5,
            pattern_boost: 0.2,
            poll_interval_secs: 900,
            error_backoff_secs: 60,
            strong_signal_threshold: 0.7,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from defaults, an optional file, and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Same as [`AnalyzerConfig::load`], reading variables from `env` instead
    /// of the process environment when given
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("timeframes")
                .source(env),
        );

        let config: AnalyzerConfig = builder
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Smallest series the detectors can analyze
    pub fn min_bars(&self) -> usize {
        self.lookback + 2
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Zero when the configured delay is not a valid duration
    pub fn min_call_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.min_call_delay_secs).unwrap_or_default()
    }

    /// Driver sleep between cycles: the base interval, capped by the time
    /// one fully rate-limited cycle takes
    pub fn poll_interval(&self) -> Duration {
        let base = Duration::from_secs(self.poll_interval_secs);
        self.rate_limited_cycle()
            .map_or(base, |rate_limited| base.min(rate_limited))
    }

    fn rate_limited_cycle(&self) -> Option<Duration> {
        let count = u32::try_from(self.timeframes.len()).ok()?;
        self.min_call_delay().checked_mul(count)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if self.timeframes.is_empty() {
            return Err(ConfigError::NoTimeframes);
        }
        if self.cache_ttl_secs == 0 || self.cache_ttl_secs > MAX_TTL.as_secs() {
            return Err(ConfigError::InvalidTtl(self.cache_ttl_secs));
        }
        let delay_ok = Duration::try_from_secs_f64(self.min_call_delay_secs)
            .is_ok_and(|delay| !delay.is_zero())
            && self.min_call_delay_secs <= MAX_CALL_DELAY_SECS
            && self.rate_limited_cycle().is_some();
        if !delay_ok {
            return Err(ConfigError::InvalidCallDelay(self.min_call_delay_secs));
        }
        if self.lookback < 2 {
            return Err(ConfigError::InvalidLookback(self.lookback));
        }
        if self.bars < self.min_bars() {
            return Err(ConfigError::TooFewBars {
                bars: self.bars,
                min: self.min_bars(),
            });
        }
        if !self.volume_multiplier.is_finite() || self.volume_multiplier <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "volume_multiplier",
                value: self.volume_multiplier,
            });
        }
        if !self.pattern_boost.is_finite() || self.pattern_boost < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "pattern_boost",
                value: self.pattern_boost,
            });
        }
        if !(0.0..=1.0).contains(&self.strong_signal_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "strong_signal_threshold",
                value: self.strong_signal_threshold,
            });
        }
        Ok(())
    }
}

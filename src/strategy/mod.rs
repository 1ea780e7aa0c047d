// Price action signal pipeline
pub mod fusion;
pub mod patterns;
pub mod price_action;
pub mod zones;

pub use fusion::{SignalFuser, TECHNICAL_PATTERN};
pub use patterns::{detect_patterns, is_bearish_engulfing, is_bullish_engulfing};
pub use price_action::{CycleReport, PriceActionAnalyzer, SeriesAnalysis};
pub use zones::ZoneDetector;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Sampling interval of a bar series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
    W1,
}

impl Timeframe {
    /// Wall-clock length of one bar
    pub fn duration(&self) -> Duration {
        let minutes = match self {
            Timeframe::M1 => 1,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::M30 => 30,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::D1 => 1_440,
            Timeframe::W1 => 10_080,
        };
        Duration::from_secs(minutes * 60)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "M1",
            Timeframe::M5 => "M5",
            Timeframe::M15 => "M15",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::H4 => "H4",
            Timeframe::D1 => "D1",
            Timeframe::W1 => "W1",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M1" => Ok(Timeframe::M1),
            "M5" => Ok(Timeframe::M5),
            "M15" => Ok(Timeframe::M15),
            "M30" => Ok(Timeframe::M30),
            "H1" => Ok(Timeframe::H1),
            "H4" => Ok(Timeframe::H4),
            "D1" => Ok(Timeframe::D1),
            "W1" => Ok(Timeframe::W1),
            other => Err(format!("Unknown timeframe: {}", other)),
        }
    }
}

/// One OHLCV sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.open > self.close
    }

    /// Check the OHLC ordering and volume sanity of a single bar
    pub fn validate(&self) -> Result<(), String> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(format!("Non-finite price in bar at {}", self.timestamp));
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(format!(
                "Invalid volume {} in bar at {}",
                self.volume, self.timestamp
            ));
        }

        let body_top = self.open.max(self.close);
        let body_bottom = self.open.min(self.close);

        if self.high < body_top {
            return Err(format!(
                "High ({}) is below body top ({}) at {}",
                self.high, body_top, self.timestamp
            ));
        }
        if self.low > body_bottom {
            return Err(format!(
                "Low ({}) is above body bottom ({}) at {}",
                self.low, body_bottom, self.timestamp
            ));
        }

        Ok(())
    }
}

/// Chronologically ordered bars for one symbol and timeframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Validate every bar and the strict timestamp ordering
    pub fn validate(&self) -> Result<(), String> {
        for bar in &self.bars {
            bar.validate()?;
        }

        for window in self.bars.windows(2) {
            if window[1].timestamp <= window[0].timestamp {
                return Err(format!(
                    "Timestamps not strictly increasing: {} then {}",
                    window[0].timestamp, window[1].timestamp
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Supply,
    Demand,
}

/// Volume-confirmed local extreme
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub kind: ZoneKind,
    pub price: f64,
    /// Rolling volatility of highs at the confirming bar
    pub strength: f64,
    /// Bar index that confirmed the zone
    pub index: usize,
}

/// Per-bar engulfing flags, aligned with the source series
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternFlags {
    pub bullish_engulfing: Vec<bool>,
    pub bearish_engulfing: Vec<bool>,
}

impl PatternFlags {
    pub fn len(&self) -> usize {
        self.bullish_engulfing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bullish_engulfing.is_empty()
    }

    /// Flags at the final bar as (bullish, bearish)
    pub fn last(&self) -> (bool, bool) {
        (
            self.bullish_engulfing.last().copied().unwrap_or(false),
            self.bearish_engulfing.last().copied().unwrap_or(false),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
    None,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => f.write_str("BUY"),
            Direction::Sell => f.write_str("SELL"),
            Direction::None => f.write_str("NONE"),
        }
    }
}

/// Directional signal for one timeframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Confidence in [0, 1]
    pub strength: f64,
    pub direction: Direction,
    pub pattern: String,
    pub timeframe: Timeframe,
}

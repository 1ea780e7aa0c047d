use crate::indicators::mean;
use crate::models::{Direction, PatternFlags, Signal, Timeframe, Zone, ZoneKind};

/// Label carried by every fused signal
pub const TECHNICAL_PATTERN: &str = "technical";

/// Combines zones and engulfing flags into one directional signal
///
/// Rules, in order:
/// 1. Zones stronger than the mean zone strength are "recent"; the last of
///    them in scan order sets direction (supply = SELL, demand = BUY) and
///    strength.
/// 2. An engulfing pattern on the final bar adds `pattern_boost` and sets
///    its direction, unless the zone already points the other way. A
///    pattern never flips a zone signal.
/// 3. Strength is clamped to [0, 1].
#[derive(Debug, Clone)]
pub struct SignalFuser {
    pattern_boost: f64,
}

impl Default for SignalFuser {
    fn default() -> Self {
        Self { pattern_boost: 0.2 }
    }
}

impl SignalFuser {
    pub fn new(pattern_boost: f64) -> Self {
        Self { pattern_boost }
    }

    /// Zone that sets the signal, if any
    ///
    /// An empty zone list and a list where no zone beats the mean both
    /// yield None.
    pub fn dominant_zone<'a>(&self, zones: &'a [Zone]) -> Option<&'a Zone> {
        let strengths: Vec<f64> = zones.iter().map(|z| z.strength).collect();
        let avg_strength = mean(&strengths)?;

        zones.iter().rev().find(|z| z.strength > avg_strength)
    }

    pub fn fuse(&self, zones: &[Zone], patterns: &PatternFlags, timeframe: Timeframe) -> Signal {
        let (mut direction, mut strength) = match self.dominant_zone(zones) {
            Some(zone) => {
                let direction = match zone.kind {
                    ZoneKind::Supply => Direction::Sell,
                    ZoneKind::Demand => Direction::Buy,
                };
                (direction, zone.strength)
            }
            None => (Direction::None, 0.0),
        };

        let (bullish, bearish) = patterns.last();
        if bullish && direction != Direction::Sell {
            strength += self.pattern_boost;
            direction = Direction::Buy;
        } else if bearish && direction != Direction::Buy {
            strength += self.pattern_boost;
            direction = Direction::Sell;
        } else if bullish || bearish {
            // Opposing pattern: boost only, zone keeps the direction
            strength += self.pattern_boost;
        }

        Signal {
            // max() first maps NaN to 0
            strength: strength.max(0.0).min(1.0),
            direction,
            pattern: TECHNICAL_PATTERN.to_string(),
            timeframe,
        }
    }
}

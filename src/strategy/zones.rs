use crate::indicators::{max_value, mean, min_value, rolling_std};
use crate::models::{Bar, BarSeries, Zone, ZoneKind};

/// Supply/demand zone detector
///
/// A zone is a bar that breaks the extreme of the preceding `lookback` bars
/// on a volume surge:
/// - Supply: high above every prior high in the window
/// - Demand: low below every prior low in the window
/// - Surge: volume above `volume_multiplier` x the window's mean volume
///
/// Zone strength is the rolling sample std of highs over the `lookback`
/// bars ending at the confirming bar, for both zone kinds.
#[derive(Debug, Clone)]
pub struct ZoneDetector {
    lookback: usize,
    volume_multiplier: f64,
}

impl Default for ZoneDetector {
    fn default() -> Self {
        Self {
            lookback: 20,
            volume_multiplier: 1.5,
        }
    }
}

impl ZoneDetector {
    pub fn new(lookback: usize, volume_multiplier: f64) -> Self {
        Self {
            lookback,
            volume_multiplier,
        }
    }

    /// Bars needed before any zone can be confirmed
    pub fn min_bars(&self) -> usize {
        self.lookback + 2
    }

    pub fn detect(&self, series: &BarSeries) -> Vec<Zone> {
        self.analyze_supply_demand(&series.bars)
    }

    /// Scan bars in order and collect every confirmed zone
    ///
    /// The last bar is never scanned since it may still be forming. Returns
    /// an empty list when there is not enough history.
    pub fn analyze_supply_demand(&self, bars: &[Bar]) -> Vec<Zone> {
        if self.lookback == 0 || bars.len() < self.min_bars() {
            return Vec::new();
        }

        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let volatility = rolling_std(&highs, self.lookback);

        let mut zones = Vec::new();

        for i in self.lookback..bars.len() - 1 {
            let window = i - self.lookback..i;

            let Some(avg_volume) = mean(&volumes[window.clone()]) else {
                continue;
            };
            let volume_surge = volumes[i] > avg_volume * self.volume_multiplier;
            if !volume_surge {
                continue;
            }

            let strength = volatility[i].unwrap_or(0.0);

            if let Some(prior_high) = max_value(&highs[window.clone()]) {
                if highs[i] > prior_high {
                    zones.push(Zone {
                        kind: ZoneKind::Supply,
                        price: highs[i],
                        strength,
                        index: i,
                    });
                }
            }

            if let Some(prior_low) = min_value(&lows[window]) {
                if lows[i] < prior_low {
                    zones.push(Zone {
                        kind: ZoneKind::Demand,
                        price: lows[i],
                        strength,
                        index: i,
                    });
                }
            }
        }

        zones
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    /// Flat bars around 100 with constant volume
    fn create_flat_bars(n: usize) -> Vec<Bar> {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        (0..n)
            .map(|i| Bar {
                timestamp: start + Duration::hours(i as i64),
                open: 100.0,
                high: 101.0 + (i % 3) as f64 * 0.1,
                low: 99.0 - (i % 3) as f64 * 0.1,
                close: 100.5,
                volume: 1_000.0,
            })
            .collect()
    }

    #[test]
    fn test_insufficient_history_returns_empty() {
        let detector = ZoneDetector::default();
        assert!(detector.analyze_supply_demand(&create_flat_bars(21)).is_empty());
        assert!(detector.analyze_supply_demand(&[]).is_empty());
    }

    #[test]
    fn test_flat_series_has_no_zones() {
        let detector = ZoneDetector::default();
        assert!(detector.analyze_supply_demand(&create_flat_bars(60)).is_empty());
    }

    #[test]
    fn test_supply_zone_on_breakout_with_volume() {
        let mut bars = create_flat_bars(25);
        bars[22].high = 105.0;
        bars[22].close = 104.0;
        bars[22].volume = 2_000.0;

        let detector = ZoneDetector::default();
        let zones = detector.analyze_supply_demand(&bars);

        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].kind, ZoneKind::Supply);
        assert_eq!(zones[0].price, 105.0);
        assert_eq!(zones[0].index, 22);

        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let expected = crate::indicators::sample_std_dev(&highs[3..=22]).unwrap();
        assert!((zones[0].strength - expected).abs() < 1e-12);
    }

    #[test]
    fn test_breakout_without_volume_is_ignored() {
        let mut bars = create_flat_bars(25);
        bars[22].high = 105.0;
        bars[22].volume = 1_400.0; // below 1.5x

        assert!(ZoneDetector::default().analyze_supply_demand(&bars).is_empty());
    }

    #[test]
    fn test_volume_exactly_at_threshold_is_not_a_surge() {
        let mut bars = create_flat_bars(25);
        bars[22].high = 105.0;
        bars[22].volume = 1_500.0;

        assert!(ZoneDetector::default().analyze_supply_demand(&bars).is_empty());
    }

    #[test]
    fn test_demand_zone_on_breakdown() {
        let mut bars = create_flat_bars(30);
        bars[25].low = 95.0;
        bars[25].open = 99.0;
        bars[25].close = 96.0;
        bars[25].volume = 3_000.0;

        let zones = ZoneDetector::default().analyze_supply_demand(&bars);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].kind, ZoneKind::Demand);
        assert_eq!(zones[0].price, 95.0);
    }

    #[test]
    fn test_outside_bar_confirms_both_zones() {
        let mut bars = create_flat_bars(30);
        bars[24].high = 110.0;
        bars[24].low = 90.0;
        bars[24].volume = 5_000.0;

        let zones = ZoneDetector::default().analyze_supply_demand(&bars);
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].kind, ZoneKind::Supply);
        assert_eq!(zones[1].kind, ZoneKind::Demand);
        assert_eq!(zones[0].strength, zones[1].strength);
    }

    #[test]
    fn test_final_bar_is_never_scanned() {
        let mut bars = create_flat_bars(25);
        let last = bars.len() - 1;
        bars[last].high = 120.0;
        bars[last].volume = 10_000.0;

        assert!(ZoneDetector::default().analyze_supply_demand(&bars).is_empty());
    }

    #[test]
    fn test_detection_is_deterministic() {
        let mut bars = create_flat_bars(80);
        bars[30].high = 104.0;
        bars[30].volume = 2_500.0;
        bars[55].low = 96.0;
        bars[55].volume = 2_500.0;

        let detector = ZoneDetector::new(10, 1.5);
        let first = detector.analyze_supply_demand(&bars);
        let second = detector.analyze_supply_demand(&bars);

        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0].index <= w[1].index));
    }
}

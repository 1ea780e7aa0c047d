use super::MarketDataGateway;
use crate::error::GatewayError;
use crate::models::{Bar, BarSeries, Timeframe};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Generates random-walk OHLCV bars for offline runs
///
/// Output is a pure function of the seed and request, so repeated runs with
/// the same seed analyze the same data.
pub struct SyntheticGateway {
    seed: u64,
    base_price: f64,
    base_volume: f64,
    /// Probability that a bar carries a volume surge
    surge_probability: f64,
    end_time: DateTime<Utc>,
    calls: Mutex<u64>,
}

impl SyntheticGateway {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            base_price: 2_000.0,
            base_volume: 1_000.0,
            surge_probability: 0.05,
            // Fixed anchor keeps timestamps reproducible
            end_time: Utc
                .timestamp_opt(1_735_689_600, 0)
                .single()
                .unwrap_or_else(Utc::now),
            calls: Mutex::new(0),
        }
    }

    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price;
        self
    }

    /// Number of fetches served
    pub fn calls(&self) -> u64 {
        self.calls.lock().map(|c| *c).unwrap_or(0)
    }

    /// Generate `count` bars ending at the anchor time
    pub fn generate(&self, symbol: &str, timeframe: Timeframe, count: usize) -> Vec<Bar> {
        let mut rng = StdRng::seed_from_u64(self.series_seed(symbol, timeframe));
        let step = Duration::seconds(timeframe.duration().as_secs() as i64);
        let start_time = self.end_time - step * count as i32;

        let mut bars = Vec::with_capacity(count);
        let mut price = self.base_price;

        for i in 0..count {
            let timestamp = start_time + step * (i as i32 + 1);

            let open = price;
            let change = open * rng.gen_range(-0.004..0.004); // ±0.4% per bar
            let close = (open + change).max(self.base_price * 0.1);
            price = close;

            bars.push(self.create_bar(&mut rng, timestamp, open, close));
        }

        bars
    }

    /// Helper to wrap an open/close pair with wicks and volume
    fn create_bar(
        &self,
        rng: &mut StdRng,
        timestamp: DateTime<Utc>,
        open: f64,
        close: f64,
    ) -> Bar {
        let wick_pct = 0.002; // up to 0.2% beyond the body

        let body_top = open.max(close);
        let body_bottom = open.min(close);
        let high = body_top * (1.0 + rng.gen_range(0.0..wick_pct));
        let low = body_bottom * (1.0 - rng.gen_range(0.0..wick_pct));

        let mut volume = self.base_volume * rng.gen_range(0.7..1.3);
        if rng.gen_bool(self.surge_probability) {
            volume *= rng.gen_range(2.0..3.5);
        }

        Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn series_seed(&self, symbol: &str, timeframe: Timeframe) -> u64 {
        let mut seed = self.seed;
        for byte in symbol.bytes().chain(timeframe.as_str().bytes()) {
            seed = seed.wrapping_mul(31).wrapping_add(byte as u64);
        }
        seed
    }
}

#[async_trait]
impl MarketDataGateway for SyntheticGateway {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<BarSeries, GatewayError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }

        let bars = self.generate(symbol, timeframe, count);
        tracing::debug!(
            symbol = %symbol,
            timeframe = %timeframe,
            bars = bars.len(),
            "Generated synthetic bars"
        );

        Ok(BarSeries::new(symbol, timeframe, bars))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

use super::MarketDataGateway;
use crate::error::GatewayError;
use crate::models::{Bar, BarSeries, Timeframe};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Serves bars recorded as JSON arrays on disk
///
/// Layout: `<dir>/<SYMBOL>_<TIMEFRAME>.json`, e.g. `data/XAUUSD_H1.json`.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    dir: PathBuf,
}

impl JsonFileGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.dir.join(format!("{}_{}.json", symbol, timeframe))
    }

    /// Read a whole bar file
    pub fn read_bars(path: &Path) -> Result<Vec<Bar>, GatewayError> {
        let raw = std::fs::read_to_string(path)?;
        let bars: Vec<Bar> = serde_json::from_str(&raw)?;
        Ok(bars)
    }
}

#[async_trait]
impl MarketDataGateway for JsonFileGateway {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<BarSeries, GatewayError> {
        let path = self.path_for(symbol, timeframe);
        if !path.exists() {
            return Err(GatewayError::UnknownSymbol(format!(
                "{} (no file at {})",
                symbol,
                path.display()
            )));
        }

        let mut bars = tokio::task::spawn_blocking(move || Self::read_bars(&path))
            .await
            .map_err(|e| GatewayError::FetchFailed {
                symbol: symbol.to_string(),
                timeframe,
                reason: e.to_string(),
            })??;

        // Keep the most recent `count` bars
        if bars.len() > count {
            bars.drain(..bars.len() - count);
        }

        tracing::debug!(
            symbol = %symbol,
            timeframe = %timeframe,
            bars = bars.len(),
            "Loaded bars from file"
        );

        Ok(BarSeries::new(symbol, timeframe, bars))
    }

    fn name(&self) -> &str {
        "json-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn create_test_bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| Bar {
                timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 3600, 0).unwrap(),
                open: 100.0 + i as f64,
                high: 102.0 + i as f64,
                low: 99.0 + i as f64,
                close: 101.0 + i as f64,
                volume: 1000.0,
            })
            .collect()
    }

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("goldbot_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_fetch_returns_most_recent_bars() {
        let dir = test_dir("file_gateway_recent");
        let gateway = JsonFileGateway::new(&dir);
        let bars = create_test_bars(10);
        std::fs::write(
            gateway.path_for("XAUUSD", Timeframe::H1),
            serde_json::to_string(&bars).unwrap(),
        )
        .unwrap();

        let series = gateway.fetch_bars("XAUUSD", Timeframe::H1, 4).await.unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(series.len(), 4);
        assert_eq!(series.bars[0], bars[6]);
        assert_eq!(series.bars[3], bars[9]);
    }

    #[tokio::test]
    async fn test_fetch_partial_when_file_is_short() {
        let dir = test_dir("file_gateway_partial");
        let gateway = JsonFileGateway::new(&dir);
        std::fs::write(
            gateway.path_for("XAUUSD", Timeframe::M15),
            serde_json::to_string(&create_test_bars(3)).unwrap(),
        )
        .unwrap();

        let series = gateway.fetch_bars("XAUUSD", Timeframe::M15, 100).await.unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(series.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_file_is_unknown_symbol() {
        let gateway = JsonFileGateway::new(test_dir("file_gateway_missing"));
        let result = gateway.fetch_bars("NOPE", Timeframe::H1, 10).await;
        assert!(matches!(result, Err(GatewayError::UnknownSymbol(_))));
    }

    #[tokio::test]
    async fn test_malformed_file_is_decode_error() {
        let dir = test_dir("file_gateway_malformed");
        let gateway = JsonFileGateway::new(&dir);
        std::fs::write(gateway.path_for("XAUUSD", Timeframe::H4), "{not json").unwrap();

        let result = gateway.fetch_bars("XAUUSD", Timeframe::H4, 10).await;
        std::fs::remove_dir_all(&dir).ok();

        assert!(matches!(result, Err(GatewayError::Decode(_))));
    }
}

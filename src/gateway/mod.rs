// Market data gateways
pub mod file;
pub mod synthetic;

pub use file::JsonFileGateway;
pub use synthetic::SyntheticGateway;

use crate::error::GatewayError;
use crate::models::{BarSeries, Timeframe};
use async_trait::async_trait;

/// Source of recent bars for an instrument
///
/// Order placement and position handling live behind the same broker
/// connection but are not part of this trait.
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// Fetch up to `count` most recent bars, oldest first. May return fewer.
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<BarSeries, GatewayError>;

    /// Gateway name for logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<G> MarketDataGateway for Box<G>
where
    G: MarketDataGateway + ?Sized,
{
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<BarSeries, GatewayError> {
        (**self).fetch_bars(symbol, timeframe, count).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

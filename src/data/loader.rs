use super::MinIntervalLimiter;
use crate::cache::ExpiringCache;
use crate::error::PipelineError;
use crate::gateway::MarketDataGateway;
use crate::models::{BarSeries, Timeframe};
use std::sync::Arc;
use std::time::Duration;

/// Cache key for one fetch request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub bars: usize,
}

/// Fetches bar series through a cache, spacing gateway calls apart
///
/// Owns both the cache and the call limiter; callers hold it by `&mut` so
/// a single cycle drives it at a time.
pub struct BarLoader<G> {
    gateway: G,
    cache: ExpiringCache<CacheKey, Arc<BarSeries>>,
    limiter: MinIntervalLimiter,
    min_bars: usize,
    gateway_calls: u64,
}

impl<G: MarketDataGateway> BarLoader<G> {
    /// # Arguments
    /// * `gateway` - Market data source
    /// * `cache_ttl` - Lifetime of a cached series
    /// * `min_call_delay` - Minimum gap between two gateway calls
    /// * `min_bars` - Shortest series worth analyzing
    pub fn new(
        gateway: G,
        cache_ttl: Duration,
        min_call_delay: Duration,
        min_bars: usize,
    ) -> Self {
        Self {
            gateway,
            cache: ExpiringCache::new(cache_ttl),
            limiter: MinIntervalLimiter::new(min_call_delay),
            min_bars,
            gateway_calls: 0,
        }
    }

    /// Load a series, from cache when live, else from the gateway
    pub async fn load(
        &mut self,
        symbol: &str,
        timeframe: Timeframe,
        bars: usize,
    ) -> Result<Arc<BarSeries>, PipelineError> {
        let key = CacheKey {
            symbol: symbol.to_string(),
            timeframe,
            bars,
        };

        if let Some(series) = self.cache.get(&key) {
            tracing::debug!(symbol = %symbol, timeframe = %timeframe, "Cache hit");
            return Ok(Arc::clone(series));
        }

        tracing::debug!(symbol = %symbol, timeframe = %timeframe, "Cache miss");

        // The permit is spent even when the fetch fails
        self.limiter.until_ready().await;
        let fetched = self.gateway.fetch_bars(symbol, timeframe, bars).await;
        self.gateway_calls += 1;

        let series = fetched.map_err(|e| PipelineError::DataUnavailable {
            timeframe,
            reason: e.to_string(),
        })?;

        if series.len() < self.min_bars {
            return Err(PipelineError::DataUnavailable {
                timeframe,
                reason: format!(
                    "Insufficient data: {} bars, need {}",
                    series.len(),
                    self.min_bars
                ),
            });
        }

        series
            .validate()
            .map_err(|reason| PipelineError::DataUnavailable { timeframe, reason })?;

        tracing::debug!(
            symbol = %symbol,
            timeframe = %timeframe,
            bars = series.len(),
            gateway = self.gateway.name(),
            "Fetched bars"
        );

        let series = Arc::new(series);
        self.cache.set(key, Arc::clone(&series));
        Ok(series)
    }

    /// Purge expired cache entries
    pub fn sweep_cache(&mut self) -> usize {
        let removed = self.cache.sweep();
        if removed > 0 {
            tracing::debug!("Swept {} expired cache entries", removed);
        }
        removed
    }

    /// Total gateway calls made, failed ones included
    pub fn gateway_calls(&self) -> u64 {
        self.gateway_calls
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

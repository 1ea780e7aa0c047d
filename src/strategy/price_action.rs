use super::fusion::SignalFuser;
use super::patterns::detect_patterns;
use super::zones::ZoneDetector;
use crate::config::AnalyzerConfig;
use crate::data::BarLoader;
use crate::error::{ConfigError, PipelineError};
use crate::gateway::MarketDataGateway;
use crate::models::{BarSeries, PatternFlags, Signal, Timeframe, Zone};
use std::time::Duration;

/// Everything derived from one series
#[derive(Debug, Clone)]
pub struct SeriesAnalysis {
    pub zones: Vec<Zone>,
    pub patterns: PatternFlags,
    pub signal: Signal,
}

impl SeriesAnalysis {
    /// Run zones + patterns -> fuse over an already-loaded series
    pub fn run(series: &BarSeries, zone_detector: &ZoneDetector, fuser: &SignalFuser) -> Self {
        let zones = zone_detector.detect(series);
        let patterns = detect_patterns(&series.bars);
        let signal = fuser.fuse(&zones, &patterns, series.timeframe);

        Self {
            zones,
            patterns,
            signal,
        }
    }
}

/// Outcome of one pass over every configured timeframe
#[derive(Debug, Default)]
pub struct CycleReport {
    /// One signal per analyzed timeframe, in configured order
    pub signals: Vec<Signal>,
    /// Timeframes left out of this cycle and why
    pub skipped: Vec<(Timeframe, PipelineError)>,
}

/// Multi-timeframe price action analyzer
///
/// Runs load -> zones + patterns -> fuse for each configured timeframe.
/// Timeframes are processed one after another; a timeframe whose data is
/// unavailable is skipped without affecting the rest.
pub struct PriceActionAnalyzer<G> {
    config: AnalyzerConfig,
    loader: BarLoader<G>,
    zone_detector: ZoneDetector,
    fuser: SignalFuser,
}

impl<G: MarketDataGateway> PriceActionAnalyzer<G> {
    pub fn new(config: AnalyzerConfig, gateway: G) -> Result<Self, ConfigError> {
        config.validate()?;

        let loader = BarLoader::new(
            gateway,
            config.cache_ttl(),
            config.min_call_delay(),
            config.min_bars(),
        );

        Ok(Self {
            zone_detector: ZoneDetector::new(config.lookback, config.volume_multiplier),
            fuser: SignalFuser::new(config.pattern_boost),
            loader,
            config,
        })
    }

    /// Run one cycle and return the signals
    pub async fn run_cycle(&mut self) -> Vec<Signal> {
        self.analyze_all_timeframes().await.signals
    }

    /// Run one cycle, keeping track of skipped timeframes
    pub async fn analyze_all_timeframes(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        let timeframes = self.config.timeframes.clone();

        for timeframe in timeframes {
            match self.analyze_timeframe(timeframe).await {
                Ok(signal) => report.signals.push(signal),
                Err(e) => {
                    tracing::warn!(
                        symbol = %self.config.symbol,
                        timeframe = %timeframe,
                        "Skipping timeframe: {}",
                        e
                    );
                    report.skipped.push((timeframe, e));
                }
            }
        }

        report
    }

    /// Load and analyze a single timeframe
    pub async fn analyze_timeframe(
        &mut self,
        timeframe: Timeframe,
    ) -> Result<Signal, PipelineError> {
        let series = self
            .loader
            .load(&self.config.symbol, timeframe, self.config.bars)
            .await?;

        let analysis = self.analyze_series(&series);

        tracing::info!(
            symbol = %self.config.symbol,
            timeframe = %timeframe,
            zones = analysis.zones.len(),
            direction = %analysis.signal.direction,
            strength = analysis.signal.strength,
            "Timeframe analyzed"
        );

        Ok(analysis.signal)
    }

    /// Pure analysis of an already-loaded series
    pub fn analyze_series(&self, series: &BarSeries) -> SeriesAnalysis {
        SeriesAnalysis::run(series, &self.zone_detector, &self.fuser)
    }

    /// Purge expired cached series
    pub fn sweep_cache(&mut self) -> usize {
        self.loader.sweep_cache()
    }

    /// Sleep between cycles
    pub fn poll_interval(&self) -> Duration {
        self.config.poll_interval()
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn loader(&self) -> &BarLoader<G> {
        &self.loader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::SyntheticGateway;
    use crate::models::Direction;

    fn create_test_config() -> AnalyzerConfig {
        AnalyzerConfig {
            min_call_delay_secs: 0.01,
            ..Default::default()
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalyzerConfig {
            timeframes: vec![],
            ..Default::default()
        };
        let result = PriceActionAnalyzer::new(config, SyntheticGateway::new(1));
        assert!(matches!(result, Err(ConfigError::NoTimeframes)));
    }

    #[tokio::test]
    async fn test_one_signal_per_timeframe_in_order() {
        let mut analyzer =
            PriceActionAnalyzer::new(create_test_config(), SyntheticGateway::new(3)).unwrap();

        let signals = analyzer.run_cycle().await;

        let timeframes: Vec<Timeframe> = signals.iter().map(|s| s.timeframe).collect();
        assert_eq!(timeframes, vec![Timeframe::M15, Timeframe::H1, Timeframe::H4]);
        for signal in &signals {
            assert!((0.0..=1.0).contains(&signal.strength));
            assert_eq!(signal.pattern, "technical");
        }
    }

    #[tokio::test]
    async fn test_second_cycle_is_served_from_cache() {
        let mut analyzer =
            PriceActionAnalyzer::new(create_test_config(), SyntheticGateway::new(3)).unwrap();

        let first = analyzer.run_cycle().await;
        let second = analyzer.run_cycle().await;

        assert_eq!(first, second);
        assert_eq!(analyzer.loader().gateway_calls(), 3);
    }

    #[test]
    fn test_bars_below_detector_minimum_rejected() {
        let config = AnalyzerConfig {
            bars: 22,
            lookback: 30,
            ..create_test_config()
        };
        // bars < lookback + 2 is a configuration error
        assert!(PriceActionAnalyzer::new(config, SyntheticGateway::new(1)).is_err());
    }

    #[test]
    fn test_analyze_series_is_pure() {
        let analyzer =
            PriceActionAnalyzer::new(create_test_config(), SyntheticGateway::new(9)).unwrap();
        let bars = SyntheticGateway::new(9).generate("XAUUSD", Timeframe::H1, 200);
        let series = BarSeries::new("XAUUSD", Timeframe::H1, bars);

        let a = analyzer.analyze_series(&series);
        let b = analyzer.analyze_series(&series);

        assert_eq!(a.zones, b.zones);
        assert_eq!(a.signal, b.signal);
        assert_eq!(a.patterns.len(), series.len());
        if a.zones.is_empty() && !a.patterns.last().0 && !a.patterns.last().1 {
            assert_eq!(a.signal.direction, Direction::None);
        }
    }

    #[test]
    fn test_series_analysis_without_gateway() {
        let bars = SyntheticGateway::new(9).generate("XAUUSD", Timeframe::H4, 150);
        let series = BarSeries::new("XAUUSD", Timeframe::H4, bars);
        let config = create_test_config();
        let analyzer = PriceActionAnalyzer::new(config, SyntheticGateway::new(1)).unwrap();

        let standalone =
            SeriesAnalysis::run(&series, &ZoneDetector::default(), &SignalFuser::default());

        assert_eq!(standalone.zones, analyzer.analyze_series(&series).zones);
        assert_eq!(standalone.signal.timeframe, Timeframe::H4);
    }
}

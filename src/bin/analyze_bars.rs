use anyhow::{Context, Result};
use clap::Parser;
use goldbot::gateway::JsonFileGateway;
use goldbot::strategy::{SeriesAnalysis, SignalFuser, ZoneDetector};
use goldbot::{AnalyzerConfig, BarSeries, Timeframe, ZoneKind};
use std::path::PathBuf;

/// One-shot zone/pattern analysis of a recorded bar file
#[derive(Debug, Parser)]
#[command(about)]
struct Args {
    /// JSON array of bars, oldest first
    file: PathBuf,

    /// Timeframe the bars were sampled at
    #[arg(long, default_value = "H1")]
    timeframe: Timeframe,

    #[arg(long, default_value = "XAUUSD")]
    symbol: String,

    /// Zone lookback window
    #[arg(long, default_value_t = 20)]
    lookback: usize,
}

fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("goldbot=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let bars = JsonFileGateway::read_bars(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let series = BarSeries::new(args.symbol.clone(), args.timeframe, bars);
    series
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Bar file failed validation")?;

    let defaults = AnalyzerConfig::default();
    let zone_detector = ZoneDetector::new(args.lookback, defaults.volume_multiplier);
    if series.len() < zone_detector.min_bars() {
        tracing::warn!(
            "Only {} bars, zone detection needs {}",
            series.len(),
            zone_detector.min_bars()
        );
    }

    let analysis = SeriesAnalysis::run(
        &series,
        &zone_detector,
        &SignalFuser::new(defaults.pattern_boost),
    );

    println!("\n{} {} - {} bars", series.symbol, series.timeframe, series.len());
    println!("{}", "─".repeat(50));
    println!("{:<8} {:>8} {:>12} {:>12}", "Kind", "Index", "Price", "Strength");

    for zone in &analysis.zones {
        let kind = match zone.kind {
            ZoneKind::Supply => "supply",
            ZoneKind::Demand => "demand",
        };
        println!(
            "{:<8} {:>8} {:>12.4} {:>12.4}",
            kind, zone.index, zone.price, zone.strength
        );
    }
    if analysis.zones.is_empty() {
        println!("(no zones)");
    }

    let (bullish, bearish) = analysis.patterns.last();
    println!("\nFinal bar: bullish engulfing = {}, bearish engulfing = {}", bullish, bearish);
    println!(
        "Signal: {} strength {:.3} ({})",
        analysis.signal.direction, analysis.signal.strength, analysis.signal.pattern
    );

    Ok(())
}

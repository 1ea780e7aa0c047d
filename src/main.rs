use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use goldbot::gateway::{JsonFileGateway, MarketDataGateway, SyntheticGateway};
use goldbot::strategy::CycleReport;
use goldbot::{AnalyzerConfig, PriceActionAnalyzer, Signal};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GatewayKind {
    /// Seeded random-walk bars
    Synthetic,
    /// Recorded bars from <data-dir>/<SYMBOL>_<TIMEFRAME>.json
    File,
}

/// Multi-timeframe price action signal bot
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML config file (GOLDBOT_* env vars override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = GatewayKind::Synthetic)]
    gateway: GatewayKind,

    /// Directory of bar files for the file gateway
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Seed for the synthetic gateway
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Starting price for the synthetic gateway
    #[arg(long, default_value_t = 2_000.0)]
    base_price: f64,

    /// Number of cycles to run, 0 runs until Ctrl+C
    #[arg(long, default_value_t = 0)]
    cycles: u64,

    /// Print each cycle's signals as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let config = AnalyzerConfig::load(cli.config.as_deref()).context("Invalid configuration")?;

    let gateway: Box<dyn MarketDataGateway> = match cli.gateway {
        GatewayKind::Synthetic => {
            Box::new(SyntheticGateway::new(cli.seed).with_base_price(cli.base_price))
        }
        GatewayKind::File => Box::new(JsonFileGateway::new(&cli.data_dir)),
    };

    tracing::info!("🚀 GoldBot starting");
    tracing::info!("📊 Configuration:");
    tracing::info!("  Symbol: {}", config.symbol);
    tracing::info!(
        "  Timeframes: {}",
        config
            .timeframes
            .iter()
            .map(|tf| tf.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    tracing::info!("  Gateway: {}", gateway.name());
    tracing::info!("  Cache TTL: {}s", config.cache_ttl_secs);
    tracing::info!("  Min call delay: {}s", config.min_call_delay_secs);

    let mut analyzer =
        PriceActionAnalyzer::new(config, gateway).context("Failed to build analyzer")?;

    tokio::select! {
        result = polling_loop(&mut analyzer, cli.cycles, cli.json) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("⚠️  Received Ctrl+C, shutting down...");
        }
    }

    tracing::info!("👋 GoldBot stopped");
    Ok(())
}

fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("goldbot=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Run cycles until the requested count is reached (forever when 0)
async fn polling_loop<G: MarketDataGateway>(
    analyzer: &mut PriceActionAnalyzer<G>,
    max_cycles: u64,
    json: bool,
) -> Result<()> {
    let mut cycle = 0u64;

    loop {
        cycle += 1;
        tracing::info!("🔄 Cycle {}", cycle);

        let report = analyzer.analyze_all_timeframes().await;
        report_signals(analyzer.config(), &report.signals, json)?;

        let swept = analyzer.sweep_cache();
        if swept > 0 {
            tracing::debug!("Purged {} expired cache entries", swept);
        }

        if max_cycles != 0 && cycle >= max_cycles {
            return Ok(());
        }

        tokio::time::sleep(next_sleep(analyzer, &report)).await;
    }
}

/// Back off when every timeframe failed, otherwise use the poll interval
fn next_sleep<G: MarketDataGateway>(
    analyzer: &PriceActionAnalyzer<G>,
    report: &CycleReport,
) -> Duration {
    if report.signals.is_empty() && !report.skipped.is_empty() {
        tracing::error!(
            "All {} timeframes failed this cycle, backing off",
            report.skipped.len()
        );
        analyzer.config().error_backoff()
    } else {
        analyzer.poll_interval()
    }
}

fn report_signals(config: &AnalyzerConfig, signals: &[Signal], json: bool) -> Result<()> {
    for signal in signals {
        if signal.strength > config.strong_signal_threshold {
            tracing::info!(
                "💪 Strong {} signal on {} {}: strength {:.2}",
                signal.direction,
                config.symbol,
                signal.timeframe,
                signal.strength
            );
        } else {
            tracing::info!(
                "  {} {} on {}: strength {:.2}",
                signal.direction,
                config.symbol,
                signal.timeframe,
                signal.strength
            );
        }
    }

    if json {
        let line = serde_json::to_string(signals).context("Failed to serialize signals")?;
        println!("{}", line);
    }

    Ok(())
}

mod config;
mod engine;
mod error;
mod indicator;
mod model;
mod provider;
mod render;
mod signal;

use std::path::Path;

use clap::Parser;
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use model::{AnalysisRequest, BarInterval, LookbackPeriod, clean_bars};
use provider::MarketData;
use provider::yahoo::YahooProvider;
use render::Renderer;
use render::terminal::TerminalRenderer;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("fetch error")]
    Fetch,
}

#[derive(Parser)]
#[command(name = "idx-signal", about = "Daily technical analysis for IDX tickers")]
struct Cli {
    /// Ticker symbol (IDX symbols carry a .JK suffix, e.g. BBCA.JK)
    #[arg(default_value = "TLKM.JK")]
    ticker: String,

    /// Path to a TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// Override the configured lookback range (1mo, 3mo, 6mo, 1y, 2y, 5y)
    #[arg(short, long)]
    period: Option<String>,

    /// Override the configured bar interval (1d, 1wk)
    #[arg(short, long)]
    interval: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load(Path::new(path)).change_context(AppError::Config)?,
        None => AppConfig::default(),
    };

    init_tracing(&config);

    let request = build_request(&cli, &config)?;

    let provider = YahooProvider::new(
        config.fetch.base_url.clone(),
        Some(config.fetch.timeout_secs),
    );

    info!(
        symbol = %request.symbol,
        period = %request.period,
        interval = %request.interval,
        "fetching daily history"
    );

    let bars = provider
        .fetch_daily(&request.symbol, request.period, request.interval)
        .await
        .change_context(AppError::Fetch)?;

    let bars = clean_bars(bars);
    if bars.is_empty() {
        // User-recoverable: nothing to analyze, not a failure of the run
        println!(
            "No data found for \"{}\". Check the ticker symbol (IDX symbols end in .JK).",
            request.symbol
        );
        return Ok(());
    }

    let frame = engine::compute_frame(&bars, &config.indicators);
    let summary = signal::summarize(&frame);

    let renderer = TerminalRenderer::new(config.display.tail_rows);
    renderer.render(&request, &frame, &summary);

    Ok(())
}

fn build_request(cli: &Cli, config: &AppConfig) -> Result<AnalysisRequest, Report<AppError>> {
    let period_str = cli.period.as_deref().unwrap_or(&config.fetch.period);
    let period = LookbackPeriod::from_str(period_str).ok_or_else(|| {
        Report::new(AppError::Config).attach(format!("unknown period \"{period_str}\""))
    })?;

    let interval_str = cli.interval.as_deref().unwrap_or(&config.fetch.interval);
    let interval = BarInterval::from_str(interval_str).ok_or_else(|| {
        Report::new(AppError::Config).attach(format!("unknown interval \"{interval_str}\""))
    })?;

    Ok(AnalysisRequest {
        symbol: cli.ticker.trim().to_owned(),
        period,
        interval,
    })
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("cli parse failed")
    }

    #[test]
    fn default_ticker_is_tlkm() {
        let cli = cli(&["idx-signal"]);
        assert_eq!(cli.ticker, "TLKM.JK");
    }

    #[test]
    fn request_uses_config_defaults() {
        let cli = cli(&["idx-signal", "BBCA.JK"]);
        let request = build_request(&cli, &AppConfig::default()).unwrap();
        assert_eq!(request.symbol, "BBCA.JK");
        assert_eq!(request.period, LookbackPeriod::Month6);
        assert_eq!(request.interval, BarInterval::Day1);
    }

    #[test]
    fn cli_period_overrides_config() {
        let cli = cli(&["idx-signal", "BBCA.JK", "--period", "1y"]);
        let request = build_request(&cli, &AppConfig::default()).unwrap();
        assert_eq!(request.period, LookbackPeriod::Year1);
    }

    #[test]
    fn unknown_period_is_an_error() {
        let cli = cli(&["idx-signal", "BBCA.JK", "--period", "9mo"]);
        assert!(build_request(&cli, &AppConfig::default()).is_err());
    }

    #[test]
    fn ticker_is_trimmed() {
        let cli = cli(&["idx-signal", "  ADRO.JK  "]);
        let request = build_request(&cli, &AppConfig::default()).unwrap();
        assert_eq!(request.symbol, "ADRO.JK");
    }
}

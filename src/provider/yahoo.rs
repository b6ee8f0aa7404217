use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ProviderError;
use crate::model::{Bar, BarInterval, LookbackPeriod};
use crate::provider::MarketData;

const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Yahoo Finance v8 chart endpoint client.
///
/// One GET per fetch: `/v8/finance/chart/{symbol}?range=...&interval=...`.
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(base_url: Option<String>, timeout_secs: Option<u64>) -> Self {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| YAHOO_BASE_URL.to_owned()),
        }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl MarketData for YahooProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn fetch_daily(
        &self,
        symbol: &str,
        period: LookbackPeriod,
        interval: BarInterval,
    ) -> BoxFuture<'_, Result<Vec<Bar>, Report<ProviderError>>> {
        let symbol = symbol.to_owned();
        Box::pin(async move {
            let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
            let params = [
                ("range", period.as_str()),
                ("interval", interval.as_str()),
                ("events", "history"),
            ];

            debug!(symbol = %symbol, range = %period, interval = %interval, "fetching chart");

            let response = self
                .client
                .get(&url)
                .query(&params)
                .send()
                .await
                .change_context(ProviderError::Request {
                    provider: "yahoo".into(),
                })?;

            // Yahoo answers unknown symbols with 404 plus an error body;
            // treat that as "no data" rather than a transport failure.
            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                info!(symbol = %symbol, "symbol not found");
                return Ok(vec![]);
            }
            if !status.is_success() {
                return Err(Report::new(ProviderError::Request {
                    provider: "yahoo".into(),
                })
                .attach(format!("HTTP status: {status}")));
            }

            let payload: ChartResponse =
                response
                    .json()
                    .await
                    .change_context(ProviderError::ResponseParse {
                        provider: "yahoo".into(),
                    })?;

            if let Some(err) = payload.chart.error {
                return Err(Report::new(ProviderError::SymbolRejected {
                    provider: "yahoo".into(),
                    symbol: symbol.clone(),
                })
                .attach(format!("{}: {}", err.code, err.description)));
            }

            let bars = payload
                .chart
                .result
                .and_then(|mut results| {
                    if results.is_empty() {
                        None
                    } else {
                        Some(results.remove(0))
                    }
                })
                .map(ChartResult::into_bars)
                .unwrap_or_default();

            info!(symbol = %symbol, bars = bars.len(), "chart fetch complete");
            Ok(bars)
        })
    }
}

// ── REST response types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

/// Per-field arrays aligned with `timestamp`; a null entry marks a day the
/// provider has no complete row for.
#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl ChartResult {
    /// Zip the column arrays into bars, dropping rows with any null field.
    fn into_bars(self) -> Vec<Bar> {
        let quote = match self.indicators.quote.into_iter().next() {
            Some(q) => q,
            None => return vec![],
        };

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let date = timestamp_to_date(ts)?;
                let open = *quote.open.get(i)?;
                let high = *quote.high.get(i)?;
                let low = *quote.low.get(i)?;
                let close = *quote.close.get(i)?;
                let volume = *quote.volume.get(i)?;
                Some(Bar {
                    date,
                    open: open?,
                    high: high?,
                    low: low?,
                    close: close?,
                    volume: volume?,
                })
            })
            .collect()
    }
}

fn timestamp_to_date(ts: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ChartResponse {
        serde_json::from_str(json).expect("parse failed")
    }

    #[test]
    fn chart_payload_parses_into_bars() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704067200, 1704153600],
                    "indicators": {
                        "quote": [{
                            "open": [100.0, 101.0],
                            "high": [105.0, 106.0],
                            "low": [99.0, 100.0],
                            "close": [104.0, 105.0],
                            "volume": [1000.0, 1200.0]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let payload = parse(json);
        let bars = payload.chart.result.unwrap().remove(0).into_bars();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[1].close, 105.0);
    }

    #[test]
    fn null_rows_are_dropped() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704067200, 1704153600, 1704240000],
                    "indicators": {
                        "quote": [{
                            "open": [100.0, null, 102.0],
                            "high": [105.0, 106.0, 107.0],
                            "low": [99.0, 100.0, 101.0],
                            "close": [104.0, null, 106.0],
                            "volume": [1000.0, 1200.0, null]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let payload = parse(json);
        let bars = payload.chart.result.unwrap().remove(0).into_bars();
        // Row 1 has null open/close, row 2 has null volume
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 104.0);
    }

    #[test]
    fn missing_result_yields_no_bars() {
        let json = r#"{"chart": {"result": null, "error": null}}"#;
        let payload = parse(json);
        assert!(payload.chart.result.is_none());
    }

    #[test]
    fn provider_error_body_parses() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        }"#;
        let payload = parse(json);
        let err = payload.chart.error.unwrap();
        assert_eq!(err.code, "Not Found");
    }

    #[test]
    fn empty_quote_arrays_yield_no_bars() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [],
                    "indicators": {"quote": [{}]}
                }],
                "error": null
            }
        }"#;
        let payload = parse(json);
        let bars = payload.chart.result.unwrap().remove(0).into_bars();
        assert!(bars.is_empty());
    }

    /// Integration test: requires network access. Run with `cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn integration_fetch_daily() {
        let provider = YahooProvider::default();
        let bars = provider
            .fetch_daily("TLKM.JK", LookbackPeriod::Month1, BarInterval::Day1)
            .await
            .unwrap();
        assert!(!bars.is_empty());
    }
}

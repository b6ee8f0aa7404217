pub mod atr;
pub mod bollinger;
pub mod ma;
pub mod macd;
pub mod rsi;
pub mod stochastic;

use error_stack::Report;

use crate::error::IndicatorError;
use crate::model::Bar;

/// A technical analysis indicator that operates on a slice of daily bars.
///
/// Bars must be in ascending chronological order (oldest first).
pub trait Indicator: Send {
    /// Unique name of this indicator (e.g., "rsi", "sma").
    #[allow(dead_code)]
    fn name(&self) -> &str;

    /// Minimum number of bars required to produce at least one output value.
    fn required_bars(&self) -> usize;

    /// Calculate indicator values from bars.
    ///
    /// Output is trailing-aligned: the first value corresponds to the first
    /// bar index at which the indicator's lookback window is satisfied, so
    /// the result may be shorter than the input.
    fn calculate(&self, bars: &[Bar]) -> Result<Vec<f64>, Report<IndicatorError>>;
}

/// Extract close prices from a slice of bars.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

#[cfg(test)]
pub(crate) mod testutil {
    use chrono::NaiveDate;

    use crate::model::Bar;

    /// Flat bars where OHLC all equal the given closes.
    pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1.0,
            })
            .collect()
    }

    /// Bars with distinct high/low/close per day.
    pub fn bars_from_hlc(rows: &[(f64, f64, f64)]) -> Vec<Bar> {
        rows.iter()
            .enumerate()
            .map(|(i, &(high, low, close))| Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high,
                low,
                close,
                volume: 1.0,
            })
            .collect()
    }
}

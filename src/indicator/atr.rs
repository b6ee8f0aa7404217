use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::Indicator;
use crate::model::Bar;

/// ATR (Average True Range) using Wilder's smoothing method.
///
/// True range per bar is max(high - low, |high - prev_close|,
/// |low - prev_close|), so a bar is needed before the first window and
/// `required_bars` is `period + 1`. Output is always >= 0.
pub struct Atr {
    period: usize,
}

impl Atr {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        "atr"
    }

    fn required_bars(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, bars: &[Bar]) -> Result<Vec<f64>, Report<IndicatorError>> {
        if bars.len() < self.required_bars() {
            bail!(IndicatorError::InsufficientData {
                required: self.required_bars(),
                available: bars.len(),
            });
        }

        let true_ranges: Vec<f64> = bars
            .windows(2)
            .map(|w| {
                let prev_close = w[0].close;
                let bar = &w[1];
                (bar.high - bar.low)
                    .max((bar.high - prev_close).abs())
                    .max((bar.low - prev_close).abs())
            })
            .collect();

        // Seed with simple average of first `period` true ranges
        let mut atr: f64 =
            true_ranges[..self.period].iter().sum::<f64>() / self.period as f64;
        let mut results = vec![atr];

        for &tr in &true_ranges[self.period..] {
            atr = (atr * (self.period - 1) as f64 + tr) / self.period as f64;
            results.push(atr);
        }

        Ok(results)
    }
}

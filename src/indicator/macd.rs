use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::ma::Ema;
use crate::indicator::{Indicator, closes};
use crate::model::Bar;

pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    pub fn new(
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Result<Self, Report<IndicatorError>> {
        if fast_period == 0 || slow_period == 0 || signal_period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "all periods must be > 0".into(),
            });
        }
        if fast_period >= slow_period {
            bail!(IndicatorError::InvalidParameter {
                name: "fast_period must be < slow_period".into(),
            });
        }
        Ok(Self {
            fast_period,
            slow_period,
            signal_period,
        })
    }

    /// Calculate (macd_line, signal_line, histogram) tuples.
    pub fn calculate_full(
        &self,
        bars: &[Bar],
    ) -> Result<Vec<(f64, f64, f64)>, Report<IndicatorError>> {
        let prices = closes(bars);
        if prices.len() < self.required_bars() {
            bail!(IndicatorError::InsufficientData {
                required: self.required_bars(),
                available: prices.len(),
            });
        }

        let fast_ema = Ema::new(self.fast_period)?.calculate_values(&prices)?;
        let slow_ema = Ema::new(self.slow_period)?.calculate_values(&prices)?;

        // Align: slow_ema is shorter by (slow_period - fast_period) elements
        let offset = self.slow_period - self.fast_period;
        let macd_line: Vec<f64> = fast_ema[offset..]
            .iter()
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect();

        let signal_line = Ema::new(self.signal_period)?.calculate_values(&macd_line)?;
        // Signal is shorter by (signal_period - 1)
        let signal_offset = self.signal_period - 1;

        let result: Vec<(f64, f64, f64)> = macd_line[signal_offset..]
            .iter()
            .zip(signal_line.iter())
            .map(|(m, s)| (*m, *s, m - s))
            .collect();

        Ok(result)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        "macd"
    }

    fn required_bars(&self) -> usize {
        self.slow_period + self.signal_period
    }

    /// Returns MACD line values only.
    fn calculate(&self, bars: &[Bar]) -> Result<Vec<f64>, Report<IndicatorError>> {
        Ok(self
            .calculate_full(bars)?
            .into_iter()
            .map(|(m, _, _)| m)
            .collect())
    }
}

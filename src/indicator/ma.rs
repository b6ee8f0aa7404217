use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, closes};
use crate::model::Bar;

/// Simple Moving Average.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    /// Calculate SMA values from a raw value slice (internal helper, also
    /// used by the Bollinger and Stochastic implementations).
    pub fn calculate_values(&self, values: &[f64]) -> Result<Vec<f64>, Report<IndicatorError>> {
        if values.len() < self.period {
            bail!(IndicatorError::InsufficientData {
                required: self.period,
                available: values.len(),
            });
        }
        Ok(values
            .windows(self.period)
            .map(|w| w.iter().sum::<f64>() / self.period as f64)
            .collect())
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        "sma"
    }

    fn required_bars(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Result<Vec<f64>, Report<IndicatorError>> {
        self.calculate_values(&closes(bars))
    }
}

/// Exponential Moving Average.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    /// Calculate EMA values from a raw value slice (internal helper).
    pub fn calculate_values(&self, values: &[f64]) -> Result<Vec<f64>, Report<IndicatorError>> {
        if values.len() < self.period {
            bail!(IndicatorError::InsufficientData {
                required: self.period,
                available: values.len(),
            });
        }

        let k = 2.0 / (self.period as f64 + 1.0);
        // Seed with SMA of first `period` values
        let seed: f64 = values[..self.period].iter().sum::<f64>() / self.period as f64;
        let mut ema = seed;
        let mut results = vec![ema];

        for &value in &values[self.period..] {
            ema = value * k + ema * (1.0 - k);
            results.push(ema);
        }

        Ok(results)
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        "ema"
    }

    fn required_bars(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Result<Vec<f64>, Report<IndicatorError>> {
        self.calculate_values(&closes(bars))
    }
}

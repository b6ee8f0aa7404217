use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::Indicator;
use crate::indicator::ma::Sma;
use crate::model::Bar;

/// Stochastic Oscillator.
///
/// %K = 100 * (close - lowest low) / (highest high - lowest low) over
/// `k_period` bars; %D is the `d_period` SMA of %K. A window whose high
/// equals its low yields a neutral %K of 50 instead of dividing by zero.
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize) -> Result<Self, Report<IndicatorError>> {
        if k_period == 0 || d_period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "both periods must be > 0".into(),
            });
        }
        Ok(Self { k_period, d_period })
    }

    /// %K series alone, trailing-aligned from bar index `k_period - 1`.
    pub fn calculate_k(&self, bars: &[Bar]) -> Result<Vec<f64>, Report<IndicatorError>> {
        if bars.len() < self.k_period {
            bail!(IndicatorError::InsufficientData {
                required: self.k_period,
                available: bars.len(),
            });
        }

        Ok(bars
            .windows(self.k_period)
            .map(|window| {
                let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
                let highest = window
                    .iter()
                    .map(|b| b.high)
                    .fold(f64::NEG_INFINITY, f64::max);
                let close = window[self.k_period - 1].close;
                let range = highest - lowest;
                if range == 0.0 {
                    50.0
                } else {
                    100.0 * (close - lowest) / range
                }
            })
            .collect())
    }

    /// Returns (%K, %D) pairs aligned to where both are defined.
    pub fn calculate_kd(&self, bars: &[Bar]) -> Result<Vec<(f64, f64)>, Report<IndicatorError>> {
        if bars.len() < self.required_bars() {
            bail!(IndicatorError::InsufficientData {
                required: self.required_bars(),
                available: bars.len(),
            });
        }

        let k_values = self.calculate_k(bars)?;
        let d_values = Sma::new(self.d_period)?.calculate_values(&k_values)?;

        // %D lags %K by (d_period - 1) entries
        let offset = self.d_period - 1;
        Ok(k_values[offset..]
            .iter()
            .zip(d_values.iter())
            .map(|(k, d)| (*k, *d))
            .collect())
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        "stochastic"
    }

    fn required_bars(&self) -> usize {
        self.k_period + self.d_period - 1
    }

    /// Returns %K values only.
    fn calculate(&self, bars: &[Bar]) -> Result<Vec<f64>, Report<IndicatorError>> {
        Ok(self
            .calculate_kd(bars)?
            .into_iter()
            .map(|(k, _)| k)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::testutil::{bars_from_closes, bars_from_hlc};

    #[test]
    fn stochastic_period_zero_invalid() {
        assert!(Stochastic::new(0, 3).is_err());
        assert!(Stochastic::new(14, 0).is_err());
    }

    #[test]
    fn stochastic_insufficient_data() {
        let stoch = Stochastic::new(14, 3).unwrap();
        assert!(stoch.calculate(&bars_from_closes(&[1.0; 10])).is_err());
    }

    #[test]
    fn stochastic_flat_window_is_neutral() {
        let stoch = Stochastic::new(3, 2).unwrap();
        let bars = bars_from_closes(&[10.0_f64; 6]);
        let pairs = stoch.calculate_kd(&bars).unwrap();
        for (k, d) in &pairs {
            assert!((k - 50.0).abs() < 1e-9);
            assert!((d - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn stochastic_close_at_high_is_100() {
        // Close sits on the window high each day
        let rows: Vec<(f64, f64, f64)> =
            (0..8).map(|i| (100.0 + i as f64, 90.0, 100.0 + i as f64)).collect();
        let stoch = Stochastic::new(3, 2).unwrap();
        let pairs = stoch.calculate_kd(&bars_from_hlc(&rows)).unwrap();
        for (k, _) in &pairs {
            assert!((k - 100.0).abs() < 1e-9, "expected %K = 100, got {k}");
        }
    }

    #[test]
    fn stochastic_close_at_low_is_0() {
        let rows: Vec<(f64, f64, f64)> =
            (0..8).map(|i| (110.0, 100.0 - i as f64, 100.0 - i as f64)).collect();
        let stoch = Stochastic::new(3, 2).unwrap();
        let pairs = stoch.calculate_kd(&bars_from_hlc(&rows)).unwrap();
        for (k, _) in &pairs {
            assert!(k.abs() < 1e-9, "expected %K = 0, got {k}");
        }
    }

    #[test]
    fn stochastic_bounded() {
        let rows: Vec<(f64, f64, f64)> = (0..50)
            .map(|i| {
                let mid = 100.0 + (i as f64 * 0.8).sin() * 10.0;
                (mid + 2.0, mid - 2.0, mid + (i % 3) as f64 - 1.0)
            })
            .collect();
        let stoch = Stochastic::new(14, 3).unwrap();
        let pairs = stoch.calculate_kd(&bars_from_hlc(&rows)).unwrap();
        for (k, d) in &pairs {
            assert!((0.0..=100.0).contains(k), "%K {k} out of range");
            assert!((0.0..=100.0).contains(d), "%D {d} out of range");
        }
    }

    #[test]
    fn stochastic_output_length() {
        let stoch = Stochastic::new(14, 3).unwrap();
        let bars = bars_from_closes(&[100.0_f64; 20]);
        let pairs = stoch.calculate_kd(&bars).unwrap();
        // 20 bars -> 7 %K values -> 5 (%K, %D) pairs
        assert_eq!(pairs.len(), 20 - 14 - 3 + 2);
    }
}

use error_stack::Report;
use tracing::warn;

use crate::error::IndicatorError;
use crate::indicator::Indicator;
use crate::indicator::atr::Atr;
use crate::indicator::bollinger::BollingerBands;
use crate::indicator::ma::Sma;
use crate::indicator::macd::Macd;
use crate::indicator::rsi::Rsi;
use crate::indicator::stochastic::Stochastic;
use crate::model::Bar;

/// Lookback parameters for every derived column.
///
/// Deserialized from the `[indicators]` config table; the defaults are the
/// standard daily-chart settings.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct IndicatorSettings {
    #[serde(default = "default_ma_period")]
    pub ma_period: usize,
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
    #[serde(default = "default_bb_period")]
    pub bb_period: usize,
    #[serde(default = "default_bb_multiplier")]
    pub bb_std_dev_multiplier: f64,
    #[serde(default = "default_stoch_k")]
    pub stoch_k_period: usize,
    #[serde(default = "default_stoch_d")]
    pub stoch_d_period: usize,
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,
}

fn default_ma_period() -> usize {
    20
}

fn default_rsi_period() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_bb_period() -> usize {
    20
}

fn default_bb_multiplier() -> f64 {
    2.0
}

fn default_stoch_k() -> usize {
    14
}

fn default_stoch_d() -> usize {
    3
}

fn default_atr_period() -> usize {
    14
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ma_period: default_ma_period(),
            rsi_period: default_rsi_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            bb_period: default_bb_period(),
            bb_std_dev_multiplier: default_bb_multiplier(),
            stoch_k_period: default_stoch_k(),
            stoch_d_period: default_stoch_d(),
            atr_period: default_atr_period(),
        }
    }
}

/// The cleaned series plus one derived column per indicator output.
///
/// Every column has the same length as `bars`; `None` marks positions where
/// the lookback window is not yet satisfied or where that indicator's
/// computation failed.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    pub bars: Vec<Bar>,
    pub ma: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_mid: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub stoch_k: Vec<Option<f64>>,
    pub stoch_d: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Compute every indicator column for `bars`.
///
/// Each indicator runs inside `isolate`, so a failure (short series, bad
/// parameters) empties only its own column(s) and the remaining indicators
/// still compute. Pure: no I/O, no state shared across invocations.
pub fn compute_frame(bars: &[Bar], settings: &IndicatorSettings) -> IndicatorFrame {
    let len = bars.len();

    let ma = isolate("ma", len, 1, || {
        let values = Sma::new(settings.ma_period)?.calculate(bars)?;
        Ok(vec![align(len, values)])
    })
    .remove(0);

    let rsi = isolate("rsi", len, 1, || {
        let values = Rsi::new(settings.rsi_period)?.calculate(bars)?;
        Ok(vec![align(len, values)])
    })
    .remove(0);

    // Multi-output indicators fail as a unit: a MACD error empties both the
    // line and the signal column.
    let mut macd_columns = isolate("macd", len, 2, || {
        let full = Macd::new(settings.macd_fast, settings.macd_slow, settings.macd_signal)?
            .calculate_full(bars)?;
        let (line, signal): (Vec<f64>, Vec<f64>) =
            full.into_iter().map(|(m, s, _)| (m, s)).unzip();
        Ok(vec![align(len, line), align(len, signal)])
    });
    let macd_signal = macd_columns.remove(1);
    let macd = macd_columns.remove(0);

    let mut bb_columns = isolate("bollinger", len, 3, || {
        let bands = BollingerBands::new(settings.bb_period, settings.bb_std_dev_multiplier)?
            .calculate_bands(bars)?;
        let mut upper = Vec::with_capacity(bands.len());
        let mut mid = Vec::with_capacity(bands.len());
        let mut lower = Vec::with_capacity(bands.len());
        for (u, m, l) in bands {
            upper.push(u);
            mid.push(m);
            lower.push(l);
        }
        Ok(vec![align(len, upper), align(len, mid), align(len, lower)])
    });
    let bb_lower = bb_columns.remove(2);
    let bb_mid = bb_columns.remove(1);
    let bb_upper = bb_columns.remove(0);

    let mut stoch_columns = isolate("stochastic", len, 2, || {
        let pairs = Stochastic::new(settings.stoch_k_period, settings.stoch_d_period)?
            .calculate_kd(bars)?;
        let (k, d): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        Ok(vec![align(len, k), align(len, d)])
    });
    let stoch_d = stoch_columns.remove(1);
    let stoch_k = stoch_columns.remove(0);

    let atr = isolate("atr", len, 1, || {
        let values = Atr::new(settings.atr_period)?.calculate(bars)?;
        Ok(vec![align(len, values)])
    })
    .remove(0);

    IndicatorFrame {
        bars: bars.to_vec(),
        ma,
        rsi,
        macd,
        macd_signal,
        bb_upper,
        bb_mid,
        bb_lower,
        stoch_k,
        stoch_d,
        atr,
    }
}

/// Run one indicator's column computation, substituting empty columns on
/// failure so the other indicators are unaffected.
fn isolate<F>(name: &str, len: usize, columns: usize, compute: F) -> Vec<Vec<Option<f64>>>
where
    F: FnOnce() -> Result<Vec<Vec<Option<f64>>>, Report<IndicatorError>>,
{
    match compute() {
        Ok(cols) => cols,
        Err(e) => {
            warn!(indicator = name, error = ?e, "indicator failed, leaving column undefined");
            vec![vec![None; len]; columns]
        }
    }
}

/// Pad a trailing-aligned indicator output to the full series length.
fn align(total_len: usize, values: Vec<f64>) -> Vec<Option<f64>> {
    let offset = total_len.saturating_sub(values.len());
    let mut output = vec![None; total_len];
    for (index, value) in values.into_iter().enumerate() {
        output[offset + index] = Some(value);
    }
    output
}

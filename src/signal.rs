use crate::engine::IndicatorFrame;

/// One fired rule, tagged with the indicator it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub indicator: &'static str,
    pub message: String,
}

impl Signal {
    fn new(indicator: &'static str, message: impl Into<String>) -> Self {
        Self {
            indicator,
            message: message.into(),
        }
    }
}

pub type SignalSummary = Vec<Signal>;

/// Value of column `col` at bar index `i`, if defined.
fn at(col: &[Option<f64>], i: usize) -> Option<f64> {
    col.get(i).copied().flatten()
}

/// Evaluate every rule against the two most recent bars.
///
/// Rules run in a fixed order (MA, RSI, MACD, Bollinger, Stochastic, ATR)
/// and are independent: a rule whose inputs are undefined is skipped, it
/// never errors. Crossover rules need two bars and emit nothing on shorter
/// series.
pub fn summarize(frame: &IndicatorFrame) -> SignalSummary {
    let mut summary = Vec::new();
    if frame.is_empty() {
        return summary;
    }

    let latest = frame.len() - 1;
    let prev = latest.checked_sub(1);
    let latest_close = frame.bars[latest].close;

    // 1. MA crossover
    if let Some(prev) = prev
        && let (Some(prev_ma), Some(ma)) = (at(&frame.ma, prev), at(&frame.ma, latest))
    {
        let prev_close = frame.bars[prev].close;
        if prev_close < prev_ma && latest_close > ma {
            summary.push(Signal::new("MA20", "Bullish: price crossed above MA20"));
        } else if prev_close > prev_ma && latest_close < ma {
            summary.push(Signal::new("MA20", "Bearish: price crossed below MA20"));
        }
    }

    // 2. RSI level (always emits when defined)
    if let Some(rsi) = at(&frame.rsi, latest) {
        let message = if rsi > 70.0 {
            format!("Overbought (RSI {rsi:.2})")
        } else if rsi < 30.0 {
            format!("Oversold (RSI {rsi:.2})")
        } else {
            format!("Neutral (RSI {rsi:.2})")
        };
        summary.push(Signal::new("RSI", message));
    }

    // 3. MACD crossover
    if let Some(prev) = prev
        && let (Some(prev_macd), Some(prev_sig), Some(macd), Some(sig)) = (
            at(&frame.macd, prev),
            at(&frame.macd_signal, prev),
            at(&frame.macd, latest),
            at(&frame.macd_signal, latest),
        )
    {
        if prev_macd <= prev_sig && macd > sig {
            summary.push(Signal::new("MACD", "Bullish: MACD crossed above signal line"));
        } else if prev_macd >= prev_sig && macd < sig {
            summary.push(Signal::new("MACD", "Bearish: MACD crossed below signal line"));
        }
    }

    // 4. Bollinger breach
    if let (Some(upper), Some(lower)) = (at(&frame.bb_upper, latest), at(&frame.bb_lower, latest))
    {
        if latest_close > upper {
            summary.push(Signal::new(
                "Bollinger",
                format!("Overbought: close above upper band ({upper:.2})"),
            ));
        } else if latest_close < lower {
            summary.push(Signal::new(
                "Bollinger",
                format!("Oversold: close below lower band ({lower:.2})"),
            ));
        }
    }

    // 5. Stochastic (an exact %K == %D tie emits nothing)
    if let (Some(k), Some(d)) = (at(&frame.stoch_k, latest), at(&frame.stoch_d, latest)) {
        if k > 80.0 && d > 80.0 {
            summary.push(Signal::new(
                "Stochastic",
                format!("Overbought (%K {k:.2}, %D {d:.2})"),
            ));
        } else if k < 20.0 && d < 20.0 {
            summary.push(Signal::new(
                "Stochastic",
                format!("Oversold (%K {k:.2}, %D {d:.2})"),
            ));
        } else if k > d {
            summary.push(Signal::new(
                "Stochastic",
                format!("Bullish (%K {k:.2} above %D {d:.2})"),
            ));
        } else if k < d {
            summary.push(Signal::new(
                "Stochastic",
                format!("Bearish (%K {k:.2} below %D {d:.2})"),
            ));
        }
    }

    // 6. ATR volatility readout (no threshold)
    if let Some(atr) = at(&frame.atr, latest) {
        summary.push(Signal::new("ATR", format!("Volatility: ATR {atr:.2}")));
    }

    summary
}

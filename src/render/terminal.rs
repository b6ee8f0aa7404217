use crate::engine::IndicatorFrame;
use crate::model::AnalysisRequest;
use crate::render::Renderer;
use crate::signal::SignalSummary;

/// Plain-text report: a tail table of the most recent rows, then the
/// signal lines in rule order.
pub struct TerminalRenderer {
    tail_rows: usize,
}

impl TerminalRenderer {
    pub fn new(tail_rows: usize) -> Self {
        Self { tail_rows }
    }

    fn table(&self, frame: &IndicatorFrame) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<12} {:>10} {:>10} {:>8} {:>9} {:>9} {:>10} {:>10} {:>10} {:>8} {:>8} {:>8}\n",
            "Date", "Close", "MA20", "RSI", "MACD", "Signal", "BB Upper", "BB Mid", "BB Lower",
            "%K", "%D", "ATR",
        ));

        let start = frame.len().saturating_sub(self.tail_rows);
        for i in start..frame.len() {
            let bar = &frame.bars[i];
            out.push_str(&format!(
                "{:<12} {:>10.2} {:>10} {:>8} {:>9} {:>9} {:>10} {:>10} {:>10} {:>8} {:>8} {:>8}\n",
                bar.date.format("%Y-%m-%d"),
                bar.close,
                cell(frame.ma[i]),
                cell(frame.rsi[i]),
                cell(frame.macd[i]),
                cell(frame.macd_signal[i]),
                cell(frame.bb_upper[i]),
                cell(frame.bb_mid[i]),
                cell(frame.bb_lower[i]),
                cell(frame.stoch_k[i]),
                cell(frame.stoch_d[i]),
                cell(frame.atr[i]),
            ));
        }
        out
    }
}

impl Renderer for TerminalRenderer {
    fn render(&self, request: &AnalysisRequest, frame: &IndicatorFrame, summary: &SignalSummary) {
        println!(
            "Technical analysis for {} ({} daily bars, range {})",
            request.symbol,
            frame.len(),
            request.period,
        );
        println!();
        print!("{}", self.table(frame));
        println!();

        if summary.is_empty() {
            println!("No signals.");
            return;
        }
        println!("Signals:");
        for signal in summary {
            println!("  [{}] {}", signal.indicator, signal.message);
        }
    }
}

/// Two-decimal cell, `-` where the column is undefined.
fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "-".to_owned(),
    }
}

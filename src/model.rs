use std::fmt;

use chrono::NaiveDate;

/// How far back the provider should fetch daily history.
///
/// String representations match the config file and the provider's
/// `range` query parameter (e.g. `"6mo"`, `"1y"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookbackPeriod {
    Month1,
    Month3,
    Month6,
    Year1,
    Year2,
    Year5,
}

impl LookbackPeriod {
    /// Parse a config-format string into a `LookbackPeriod`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1mo" => Some(Self::Month1),
            "3mo" => Some(Self::Month3),
            "6mo" => Some(Self::Month6),
            "1y" => Some(Self::Year1),
            "2y" => Some(Self::Year2),
            "5y" => Some(Self::Year5),
            _ => None,
        }
    }

    /// Return the config-format string representation.
    ///
    /// Also the exact `range` value the Yahoo chart endpoint accepts.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Month1 => "1mo",
            Self::Month3 => "3mo",
            Self::Month6 => "6mo",
            Self::Year1 => "1y",
            Self::Year2 => "2y",
            Self::Year5 => "5y",
        }
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Width of one bar in the fetched series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarInterval {
    Day1,
    Week1,
}

impl BarInterval {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1d" => Some(Self::Day1),
            "1wk" => Some(Self::Week1),
            _ => None,
        }
    }

    /// Return the provider's `interval` query value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day1 => "1d",
            Self::Week1 => "1wk",
        }
    }
}

impl fmt::Display for BarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One trading day of a ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

/// One analysis run: which ticker, over what window.
///
/// Carries everything the provider and the report need; there is no other
/// per-run state.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub period: LookbackPeriod,
    pub interval: BarInterval,
}

/// Normalize a raw fetched series for indicator computation.
///
/// Drops bars with any non-finite OHLCV field, sorts by date and removes
/// duplicate dates keeping the most recently fetched bar. Every bar in the
/// returned series has finite fields and a strictly increasing date.
pub fn clean_bars(bars: Vec<Bar>) -> Vec<Bar> {
    let mut bars: Vec<Bar> = bars.into_iter().filter(Bar::is_finite).collect();
    bars.sort_by_key(|b| b.date);
    bars.dedup_by(|next, prev| {
        if next.date == prev.date {
            // keep the later entry, it supersedes the earlier fetch row
            *prev = next.clone();
            true
        } else {
            false
        }
    });
    bars
}

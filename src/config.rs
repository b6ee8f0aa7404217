use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::engine::IndicatorSettings;
use crate::error::ConfigError;
use crate::model::{BarInterval, LookbackPeriod};

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_period() -> String {
    "6mo".into()
}

fn default_interval() -> String {
    "1d".into()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_tail_rows() -> usize {
    5
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub indicators: IndicatorSettings,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_period")]
    pub period: String,
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Override the provider host, mainly for tests against a local stub.
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            interval: default_interval(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DisplayConfig {
    /// How many of the most recent rows the report table shows.
    #[serde(default = "default_tail_rows")]
    pub tail_rows: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tail_rows: default_tail_rows(),
        }
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_fetch(config)?;
    validate_indicators(config)?;
    validate_display(config)?;
    Ok(())
}

fn validate_fetch(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if LookbackPeriod::from_str(&config.fetch.period).is_none() {
        return Err(Report::new(ConfigError::Validation {
            field: format!("fetch.period: unknown period \"{}\"", config.fetch.period),
        }));
    }
    if BarInterval::from_str(&config.fetch.interval).is_none() {
        return Err(Report::new(ConfigError::Validation {
            field: format!(
                "fetch.interval: unknown interval \"{}\"",
                config.fetch.interval
            ),
        }));
    }
    if config.fetch.timeout_secs == 0 {
        return Err(Report::new(ConfigError::Validation {
            field: "fetch.timeout_secs must be > 0".into(),
        }));
    }
    Ok(())
}

fn validate_indicators(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let ind = &config.indicators;
    let periods = [
        ("indicators.ma_period", ind.ma_period),
        ("indicators.rsi_period", ind.rsi_period),
        ("indicators.macd_fast", ind.macd_fast),
        ("indicators.macd_slow", ind.macd_slow),
        ("indicators.macd_signal", ind.macd_signal),
        ("indicators.bb_period", ind.bb_period),
        ("indicators.stoch_k_period", ind.stoch_k_period),
        ("indicators.stoch_d_period", ind.stoch_d_period),
        ("indicators.atr_period", ind.atr_period),
    ];
    for (field, period) in periods {
        if period == 0 {
            return Err(Report::new(ConfigError::Validation {
                field: format!("{field} must be > 0"),
            }));
        }
    }
    if ind.macd_fast >= ind.macd_slow {
        return Err(Report::new(ConfigError::Validation {
            field: "indicators.macd_fast must be < indicators.macd_slow".into(),
        }));
    }
    if !ind.bb_std_dev_multiplier.is_finite() || ind.bb_std_dev_multiplier <= 0.0 {
        return Err(Report::new(ConfigError::Validation {
            field: "indicators.bb_std_dev_multiplier must be > 0".into(),
        }));
    }
    Ok(())
}

fn validate_display(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if config.display.tail_rows == 0 {
        return Err(Report::new(ConfigError::Validation {
            field: "display.tail_rows must be > 0".into(),
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        toml::from_str(toml).expect("parse failed")
    }

    #[test]
    fn valid_full_config_parses() {
        let toml = r#"
[general]
log_level = "debug"
log_format = "json"

[fetch]
period = "1y"
interval = "1d"
timeout_secs = 20

[indicators]
ma_period = 50
rsi_period = 7
macd_fast = 10
macd_slow = 30
macd_signal = 5
bb_period = 20
bb_std_dev_multiplier = 2.5
stoch_k_period = 9
stoch_d_period = 3
atr_period = 10

[display]
tail_rows = 10
"#;
        let config = parse(toml);
        assert!(validate(&config).is_ok());
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.fetch.period, "1y");
        assert_eq!(config.indicators.ma_period, 50);
        assert_eq!(config.display.tail_rows, 10);
    }

    #[test]
    fn defaults_applied_when_fields_omitted() {
        let config = parse("");
        assert!(validate(&config).is_ok());
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "text");
        assert_eq!(config.fetch.period, "6mo");
        assert_eq!(config.fetch.interval, "1d");
        assert_eq!(config.fetch.timeout_secs, 10);
        assert_eq!(config.indicators.ma_period, 20);
        assert_eq!(config.indicators.rsi_period, 14);
        assert_eq!(config.indicators.macd_fast, 12);
        assert_eq!(config.indicators.macd_slow, 26);
        assert_eq!(config.indicators.stoch_k_period, 14);
        assert_eq!(config.indicators.atr_period, 14);
        assert_eq!(config.display.tail_rows, 5);
    }

    #[test]
    fn invalid_period_string_rejected() {
        let config = parse("[fetch]\nperiod = \"9mo\"\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn invalid_interval_string_rejected() {
        let config = parse("[fetch]\ninterval = \"1h\"\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_indicator_period_rejected() {
        let config = parse("[indicators]\nrsi_period = 0\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn macd_fast_not_below_slow_rejected() {
        let config = parse("[indicators]\nmacd_fast = 26\nmacd_slow = 26\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_tail_rows_rejected() {
        let config = parse("[display]\ntail_rows = 0\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn negative_bb_multiplier_rejected() {
        let config = parse("[indicators]\nbb_std_dev_multiplier = -2.0\n");
        assert!(validate(&config).is_err());
    }
}

use crate::analyzer::{AnalysisParams, DEFAULT_LAG, DEFAULT_WINDOW};
use crate::model::TrendsRequest;
use crate::monitor::MonitorSettings;
use crate::sink::OutputFormat;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "TREND_WATCH_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub keywords: Vec<String>,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    #[serde(default)]
    pub geo: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_tz_offset")]
    pub tz_offset_minutes: i32,
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_window")]
    pub moving_average_window: usize,
    #[serde(default = "default_lag")]
    pub autocorrelation_lag: usize,
    #[serde(default)]
    pub drop_partial: bool,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

fn default_timeframe() -> String {
    "today 5-y".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_tz_offset() -> i32 {
    360
}

fn default_check_interval() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    30
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_lag() -> usize {
    DEFAULT_LAG
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keywords.is_empty() {
            return Err(ConfigError::Invalid("`keywords` must not be empty".into()));
        }
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Invalid("`keywords` contains a blank entry".into()));
        }
        if self.moving_average_window == 0 {
            return Err(ConfigError::Invalid("`moving_average_window` must be positive".into()));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("`request_timeout_seconds` must be positive".into()));
        }
        Ok(())
    }

    pub fn request_for(&self, keyword: &str) -> TrendsRequest {
        TrendsRequest {
            keyword: keyword.to_string(),
            timeframe: self.timeframe.clone(),
            geo: self.geo.clone(),
            language: self.language.clone(),
            tz_offset_minutes: self.tz_offset_minutes,
        }
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            interval: Duration::from_secs(self.check_interval_seconds),
            analysis: AnalysisParams {
                window: self.moving_average_window,
                lag: self.autocorrelation_lag,
            },
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Config path from `TREND_WATCH_CONFIG`, falling back to `config.json`.
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = parse_config(r#"{"keywords": ["rust"]}"#).unwrap();
        assert_eq!(config.timeframe, "today 5-y");
        assert_eq!(config.geo, "");
        assert_eq!(config.check_interval_seconds, 60);
        assert_eq!(config.output_format, OutputFormat::Table);
        assert!(config.export_dir.is_none());

        let settings = config.monitor_settings();
        assert_eq!(settings.interval, Duration::from_secs(60));
        assert_eq!(settings.analysis, AnalysisParams { window: 3, lag: 1 });
    }

    #[test]
    fn full_config_parses() {
        let config = parse_config(
            r#"{
                "keywords": ["rust", "go"],
                "timeframe": "today 12-m",
                "geo": "DE",
                "check_interval_seconds": 300,
                "moving_average_window": 4,
                "autocorrelation_lag": 2,
                "drop_partial": true,
                "output_format": "json",
                "export_dir": "results"
            }"#,
        )
        .unwrap();
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.export_dir, Some(PathBuf::from("results")));
        let request = config.request_for("go");
        assert_eq!(request.keyword, "go");
        assert_eq!(request.geo, "DE");
        assert_eq!(request.timeframe, "today 12-m");
    }

    #[test]
    fn rejects_empty_keywords_and_zero_window() {
        assert!(matches!(parse_config(r#"{"keywords": []}"#), Err(ConfigError::Invalid(_))));
        assert!(matches!(parse_config(r#"{"keywords": ["  "]}"#), Err(ConfigError::Invalid(_))));
        assert!(matches!(
            parse_config(r#"{"keywords": ["rust"], "moving_average_window": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(parse_config("{"), Err(ConfigError::Json(_))));
        assert!(matches!(load_config("/nonexistent/config.json"), Err(ConfigError::Io(_))));
    }
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AppError;
use crate::input::{normalize_tickers, DEFAULT_SHOTS};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub run: RunConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Sent as `interval` on the timeseries call; the backend uses "1d" when absent.
    #[serde(default)]
    pub interval: Option<String>,
    /// No timeout is applied when unset.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub tickers: String,
    pub period: String,
    #[serde(default = "default_periods")]
    pub periods: Vec<String>,
    #[serde(default = "default_use_quantum")]
    pub use_quantum: bool,
    #[serde(default = "default_shots")]
    pub shots: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    pub max_log_lines: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 100,
            max_log_lines: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("report"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

fn default_periods() -> Vec<String> {
    ["1mo", "3mo", "6mo", "1y", "2y", "5y"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

fn default_use_quantum() -> bool {
    true
}

fn default_shots() -> u32 {
    DEFAULT_SHOTS
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl RunConfig {
    /// Index of the configured period in the selector list.
    pub fn period_index(&self) -> usize {
        self.periods
            .iter()
            .position(|p| p == &self.period)
            .unwrap_or(0)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;

        let mut config = Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        if let Ok(base_url) = std::env::var("QAE_API_BASE_URL") {
            if !base_url.trim().is_empty() {
                config.api.base_url = base_url.trim().to_string();
            }
        }
        if let Ok(dir) = std::env::var("QAE_REPORT_DIR") {
            if !dir.trim().is_empty() {
                config.report.output_dir = PathBuf::from(dir.trim());
            }
        }

        config.validate().context("configuration is invalid")?;
        Ok(config)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("invalid TOML")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        url::Url::parse(&self.api.base_url).map_err(|e| {
            AppError::Config(format!("api.base_url '{}': {}", self.api.base_url, e))
        })?;
        if self.run.periods.is_empty() {
            return Err(AppError::Config("run.periods must not be empty".to_string()));
        }
        if !self.run.periods.iter().any(|p| p == &self.run.period) {
            return Err(AppError::Config(format!(
                "run.period '{}' is not one of run.periods {:?}",
                self.run.period, self.run.periods
            )));
        }
        if normalize_tickers(&self.run.tickers).is_empty() {
            return Err(AppError::Config(
                "run.tickers must name at least one ticker".to_string(),
            ));
        }
        if self.run.shots == 0 {
            return Err(AppError::Config("run.shots must be > 0".to_string()));
        }
        Ok(())
    }
}

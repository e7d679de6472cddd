//! Serializable analysis configuration.
//!
//! Everything that used to be a process-wide constant (smoothing window,
//! maximum lag, instrument list, reference instrument) lives here and is
//! passed explicitly into the orchestrator.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use corrlab_core::forecast::{AdditiveModelConfig, SeasonalityConfig, MIN_FORECAST_SAMPLES};

/// Configuration errors. All of them are fatal and abort the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("moving-average window must be >= 1, got {0}")]
    InvalidWindow(usize),

    #[error("instrument universe is empty")]
    EmptyUniverse,

    #[error("reference instrument '{0}' is not in the instrument list")]
    ReferenceNotInUniverse(String),

    #[error("duplicate instruments: {0:?}")]
    DuplicateInstruments(Vec<String>),

    #[error("forecast interval width must be in (0, 1), got {0}")]
    InvalidIntervalWidth(f64),

    #[error("forecast min_samples must be >= 2, got {0}")]
    InvalidMinSamples(usize),
}

/// Forecast settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub daily_seasonality: bool,
    pub weekly_seasonality: bool,
    pub yearly_seasonality: bool,
    /// Coverage of the yhat_lower..yhat_upper interval.
    pub interval_width: f64,
    /// Series with fewer usable points are skipped.
    pub min_samples: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        let seasonality = SeasonalityConfig::daily_only();
        Self {
            daily_seasonality: seasonality.daily,
            weekly_seasonality: seasonality.weekly,
            yearly_seasonality: seasonality.yearly,
            interval_width: 0.8,
            min_samples: MIN_FORECAST_SAMPLES,
        }
    }
}

impl ForecastConfig {
    /// Model settings for the additive forecaster.
    pub fn model_config(&self) -> AdditiveModelConfig {
        AdditiveModelConfig {
            seasonality: SeasonalityConfig {
                daily: self.daily_seasonality,
                weekly: self.weekly_seasonality,
                yearly: self.yearly_seasonality,
            },
            interval_width: self.interval_width,
            ..AdditiveModelConfig::default()
        }
    }
}

/// Complete configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Instruments to analyze (CSV column names).
    pub instruments: Vec<String>,

    /// Instrument that every cross-correlation is measured against.
    pub reference: String,

    /// Trailing moving-average window, in observations.
    #[serde(default = "default_ma_window")]
    pub ma_window: usize,

    /// Largest lag for ACF and CCF.
    #[serde(default = "default_max_lag")]
    pub max_lag: usize,

    /// Fit per-instrument forecasts on a thread pool.
    #[serde(default)]
    pub parallel_forecasts: bool,

    #[serde(default)]
    pub forecast: ForecastConfig,
}

fn default_ma_window() -> usize {
    20
}

fn default_max_lag() -> usize {
    60
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            instruments: [
                "NIFTY50",
                "Tata_Steel",
                "Reliance",
                "Hindustan_Unilever",
                "Tata_Communcations",
                "Finolex_Cables",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            reference: "NIFTY50".into(),
            ma_window: default_ma_window(),
            max_lag: default_max_lag(),
            parallel_forecasts: false,
            forecast: ForecastConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the invariants the orchestrator relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ma_window == 0 {
            return Err(ConfigError::InvalidWindow(self.ma_window));
        }
        if self.instruments.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        if !self.instruments.contains(&self.reference) {
            return Err(ConfigError::ReferenceNotInUniverse(self.reference.clone()));
        }
        let mut seen = std::collections::BTreeSet::new();
        let duplicates: Vec<String> = self
            .instruments
            .iter()
            .filter(|i| !seen.insert(i.as_str()))
            .cloned()
            .collect();
        if !duplicates.is_empty() {
            return Err(ConfigError::DuplicateInstruments(duplicates));
        }
        let width = self.forecast.interval_width;
        if !(width > 0.0 && width < 1.0) {
            return Err(ConfigError::InvalidIntervalWidth(width));
        }
        if self.forecast.min_samples < 2 {
            return Err(ConfigError::InvalidMinSamples(self.forecast.min_samples));
        }
        Ok(())
    }
}

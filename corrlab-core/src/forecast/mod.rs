//! One-step-ahead forecasting.
//!
//! The model is hidden behind the narrow [`Forecaster`] fit/predict trait so
//! the orchestrator never depends on its internals. [`ForecastAdapter`]
//! owns the contract callers rely on: minimum-sample guard, daily step,
//! and extraction of the last fitted row plus the single future row.

pub mod adapter;
pub mod additive;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use adapter::{ForecastAdapter, MIN_FORECAST_SAMPLES};
pub use additive::{AdditiveModel, AdditiveModelConfig, SeasonalityConfig};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("model has not been fitted")]
    NotFitted,

    #[error("insufficient data: need {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("{dates} dates but {values} values")]
    LengthMismatch { dates: usize, values: usize },

    #[error("numerical error: {0}")]
    NumericalError(String),

    #[error("model returned {0} rows, expected the last fitted row and one future row")]
    MalformedPrediction(usize),
}

/// Step between consecutive forecast dates. Forecasts are daily only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
}

impl Frequency {
    pub fn step(self) -> chrono::Duration {
        match self {
            Frequency::Daily => chrono::Duration::days(1),
        }
    }
}

/// One predicted row: point estimate with its uncertainty interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Outcome of a one-step forecast for a single instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub name: String,
    /// Fitted row for the last observed date.
    pub last_fitted: ForecastRow,
    /// The single future row, one step past the last observed date.
    pub next: ForecastRow,
}

/// Everything behind a [`ForecastResult`]: the observations the model was
/// fitted on and every predicted row, one per observation plus the future row.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastFit {
    pub result: ForecastResult,
    /// Finite observations, aligned with `rows[..rows.len() - 1]`.
    pub observed: Vec<f64>,
    pub rows: Vec<ForecastRow>,
}

impl ForecastFit {
    /// Predicted rows paired with the observation on the same date; the
    /// future row has none.
    pub fn history(&self) -> impl Iterator<Item = (&ForecastRow, Option<f64>)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row, self.observed.get(i).copied()))
    }
}

/// A seasonal time-series model with a fit/predict lifecycle.
///
/// `predict` returns one row per fitted date followed by `periods` future
/// rows spaced by `frequency` after the last fitted date.
pub trait Forecaster: Send {
    fn fit(&mut self, dates: &[NaiveDate], values: &[f64]) -> Result<(), ForecastError>;

    fn predict(
        &self,
        periods: usize,
        frequency: Frequency,
    ) -> Result<Vec<ForecastRow>, ForecastError>;
}

/// Builds a fresh, unfitted model per instrument.
pub trait ForecasterFactory: Send + Sync {
    fn build(&self) -> Box<dyn Forecaster>;
}

impl<F> ForecasterFactory for F
where
    F: Fn() -> Box<dyn Forecaster> + Send + Sync,
{
    fn build(&self) -> Box<dyn Forecaster> {
        self()
    }
}

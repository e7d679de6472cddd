//! Correlation estimators: autocorrelation (ACF) and cross-correlation (CCF).
//!
//! Inputs must be free of undefined values; upstream transforms drop them.
//! Neither estimator clamps `max_lag`: asking for more lags than the data can
//! support is an `InsufficientData` error. Use [`clamp_max_lag`] first.

pub mod acf;
pub mod ccf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use acf::acf;
pub use ccf::ccf;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("insufficient data: need {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("series lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("series has zero variance")]
    ZeroVariance,
}

/// Largest lag computable from `n` points, capped at `max_lag`.
///
/// Returns `None` for an empty series.
pub fn clamp_max_lag(max_lag: usize, n: usize) -> Option<usize> {
    n.checked_sub(1).map(|cap| max_lag.min(cap))
}

/// Correlation coefficient per lag over a contiguous lag range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationFunction {
    min_lag: i64,
    values: Vec<f64>,
}

impl CorrelationFunction {
    fn new(min_lag: i64, values: Vec<f64>) -> Self {
        Self { min_lag, values }
    }

    /// Coefficient at `lag`, or `None` outside the computed range.
    pub fn get(&self, lag: i64) -> Option<f64> {
        let offset = lag.checked_sub(self.min_lag)?;
        usize::try_from(offset)
            .ok()
            .and_then(|i| self.values.get(i).copied())
    }

    pub fn min_lag(&self) -> i64 {
        self.min_lag
    }

    pub fn max_lag(&self) -> i64 {
        self.min_lag + self.values.len() as i64 - 1
    }

    /// Lags in ascending order.
    pub fn lags(&self) -> impl Iterator<Item = i64> + '_ {
        (0..self.values.len()).map(move |i| self.min_lag + i as i64)
    }

    /// Coefficients in ascending lag order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(lag, coefficient)` pairs in ascending lag order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.lags().zip(self.values.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Lag with the largest absolute coefficient (first one on ties).
    pub fn peak(&self) -> Option<(i64, f64)> {
        self.iter().fold(None, |best, (lag, v)| match best {
            Some((_, b)) if b.abs() >= v.abs() => best,
            _ => Some((lag, v)),
        })
    }
}

/// Subtract the mean from every value.
fn centered(values: &[f64]) -> Vec<f64> {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| v - mean).collect()
}

/// Dot product of two equal-length slices.
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Sums of squares below this are treated as zero variance.
const VARIANCE_EPSILON: f64 = 1e-12;

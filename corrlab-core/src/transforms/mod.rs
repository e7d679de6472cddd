//! Series transforms: moving-average smoothing and percentage returns.
//!
//! Transforms are pure functions: values in, values out, same length. The
//! first `lookback()` outputs are undefined (NaN) and so is any output whose
//! inputs are undefined or would divide by zero. [`SeriesTransform::apply`]
//! drops every undefined point, so nothing downstream ever sees one.

pub mod returns;
pub mod sma;

use thiserror::Error;

use crate::domain::TimeSeries;

pub use returns::{pct_change, PctChange};
pub use sma::{moving_average, MovingAverage};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("moving-average window must be >= 1, got {0}")]
    InvalidWindow(usize),
}

/// A positional transform over a series' values.
///
/// # Look-ahead guard
/// Output at position `i` may depend only on inputs at positions `<= i`.
pub trait SeriesTransform: Send + Sync {
    /// Short name used to label derived series (e.g. `"ma_20"`).
    fn name(&self) -> &str;

    /// Number of leading positions that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the transform positionally. Undefined positions are NaN.
    fn compute(&self, values: &[f64]) -> Vec<f64>;

    /// Transform a series and drop its undefined points.
    fn apply(&self, series: &TimeSeries) -> TimeSeries {
        let name = format!("{}_{}", series.name(), self.name());
        series.with_values(name, self.compute(series.values()))
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Build a daily series from raw values for tests.
#[cfg(test)]
pub fn make_series(values: &[f64]) -> TimeSeries {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    TimeSeries::from_points(
        "TEST",
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (base + chrono::Duration::days(i as i64), *v)),
    )
    .unwrap()
}

/// Default epsilon for transform tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

//! Sample autocorrelation.
//!
//! For lag k the head `x[0..n-k]` and the tail `x[k..n]` are correlated:
//!
//! r(k) = Σ (h - mean(h))(t - mean(t)) / sqrt(Σ (h - mean(h))² · Σ (t - mean(t))²)
//!
//! This is the Pearson correlation of the two overlapping segments, each
//! centered on its own mean. The point count cancels, so unlike the
//! textbook global-mean estimator the coefficients do not shrink toward
//! zero as the overlap gets shorter. At high lags the overlap is only a few
//! points: at lag n-2 it is two points and the value is always ±1 (or 0 when
//! the pair is flat). Keep `max_lag` well below the series length when the
//! tail matters.

use super::{centered, dot, CorrelationFunction, StatsError, VARIANCE_EPSILON};

/// Autocorrelation of `values` over lags `0..=max_lag`.
///
/// Lag 0 is exactly 1.0. Fails with `InsufficientData` when
/// `max_lag >= values.len()` and with `ZeroVariance` for a constant series.
/// A lag whose head or tail is constant (e.g. the single-point overlap at
/// lag n-1) has no measurable co-movement and reports 0.0.
pub fn acf(values: &[f64], max_lag: usize) -> Result<CorrelationFunction, StatsError> {
    let n = values.len();
    if n == 0 || max_lag >= n {
        return Err(StatsError::InsufficientData {
            required: max_lag + 1,
            actual: n,
        });
    }

    let x = centered(values);
    if dot(&x, &x) < VARIANCE_EPSILON {
        return Err(StatsError::ZeroVariance);
    }

    let mut coeffs = Vec::with_capacity(max_lag + 1);
    coeffs.push(1.0);
    for k in 1..=max_lag {
        coeffs.push(lagged_correlation(&values[..n - k], &values[k..]));
    }

    Ok(CorrelationFunction::new(0, coeffs))
}

/// Biased sample correlation of two equal-length slices.
fn lagged_correlation(head: &[f64], tail: &[f64]) -> f64 {
    let a = centered(head);
    let b = centered(tail);
    let denom = (dot(&a, &a) * dot(&b, &b)).sqrt();
    if denom < VARIANCE_EPSILON {
        return 0.0;
    }
    (dot(&a, &b) / denom).clamp(-1.0, 1.0)
}

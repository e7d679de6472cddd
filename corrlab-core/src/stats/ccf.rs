//! Sample cross-correlation between two aligned series.
//!
//! Both series are centered on their own means, then for each lag k:
//!
//! c(k) = Σ_i x[i]·y[i+k] / sqrt(Σx² · Σy²)
//!
//! where i runs over the indices with both terms in range. Positive k pairs x
//! with later y values, so a peak at k > 0 means x leads y. c(0) is the
//! Pearson correlation of the two series, and c_xy(k) = c_yx(-k).

use super::{centered, dot, CorrelationFunction, StatsError, VARIANCE_EPSILON};

/// Cross-correlation of `x` and `y` over lags `-max_lag..=max_lag`.
///
/// The inputs must already be aligned (same length, same dates); this
/// function does not align them. Fails with `LengthMismatch`,
/// `InsufficientData` when `n <= max_lag`, or `ZeroVariance` when either
/// series is constant.
pub fn ccf(x: &[f64], y: &[f64], max_lag: usize) -> Result<CorrelationFunction, StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    let n = x.len();
    if n <= max_lag {
        return Err(StatsError::InsufficientData {
            required: max_lag + 1,
            actual: n,
        });
    }

    let xc = centered(x);
    let yc = centered(y);
    let sxx = dot(&xc, &xc);
    let syy = dot(&yc, &yc);
    if sxx < VARIANCE_EPSILON || syy < VARIANCE_EPSILON {
        return Err(StatsError::ZeroVariance);
    }
    let norm = (sxx * syy).sqrt();

    let lags = max_lag as i64;
    let coeffs = (-lags..=lags)
        .map(|k| {
            let shift = k.unsigned_abs() as usize;
            let sum = if k >= 0 {
                dot(&xc[..n - shift], &yc[shift..])
            } else {
                dot(&xc[shift..], &yc[..n - shift])
            };
            sum / norm
        })
        .collect();

    Ok(CorrelationFunction::new(-lags, coeffs))
}

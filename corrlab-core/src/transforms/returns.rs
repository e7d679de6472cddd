//! Simple percentage change (one-period return).
//!
//! ret[t] = (v[t] - v[t-1]) / v[t-1]
//! Lookback: 1. A zero or undefined prior value makes ret[t] undefined.

use super::SeriesTransform;
use crate::domain::TimeSeries;

#[derive(Debug, Clone, Default)]
pub struct PctChange;

impl SeriesTransform for PctChange {
    fn name(&self) -> &str {
        "ret"
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];

        for i in 1..n {
            let prev = values[i - 1];
            let curr = values[i];
            if prev.is_finite() && curr.is_finite() && prev != 0.0 {
                result[i] = (curr - prev) / prev;
            }
        }

        result
    }
}

/// Percentage-change series with the undefined first point dropped.
pub fn pct_change(series: &TimeSeries) -> TimeSeries {
    PctChange.apply(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::{assert_approx, make_series, DEFAULT_EPSILON};

    #[test]
    fn pct_change_basic() {
        let s = make_series(&[100.0, 110.0, 99.0]);
        let r = pct_change(&s);
        assert_eq!(r.len(), 2);
        assert_eq!(r.dates(), &s.dates()[1..]);
        assert_approx(r.values()[0], 0.10, DEFAULT_EPSILON);
        assert_approx(r.values()[1], -0.10, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_prior_value_is_dropped() {
        let s = make_series(&[0.0, 5.0, 10.0]);
        let r = pct_change(&s);
        // 0 → 5 is undefined; 5 → 10 is +100%
        assert_eq!(r.len(), 1);
        assert_eq!(r.dates()[0], s.dates()[2]);
        assert_approx(r.values()[0], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn nan_input_is_not_propagated() {
        let out = PctChange.compute(&[100.0, f64::NAN, 120.0]);
        assert!(out[1].is_nan());
        assert!(out[2].is_nan());
    }

    #[test]
    fn single_point_yields_empty() {
        assert!(pct_change(&make_series(&[42.0])).is_empty());
        assert!(pct_change(&make_series(&[])).is_empty());
    }
}

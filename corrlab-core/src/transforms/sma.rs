//! Simple Moving Average (SMA).
//!
//! Trailing unweighted mean over a fixed window.
//! Lookback: window - 1 (first defined value at index window-1).

use super::{SeriesTransform, TransformError};
use crate::domain::TimeSeries;

#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: usize,
    name: String,
}

impl MovingAverage {
    pub fn new(window: usize) -> Result<Self, TransformError> {
        if window == 0 {
            return Err(TransformError::InvalidWindow(window));
        }
        Ok(Self {
            window,
            name: format!("ma_{window}"),
        })
    }
}

impl SeriesTransform for MovingAverage {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];

        if n < self.window {
            return result;
        }

        // Initial window sum
        let mut sum: f64 = values[..self.window].iter().sum();
        let mut nan_in_window = values[..self.window].iter().any(|v| !v.is_finite());
        if !nan_in_window {
            result[self.window - 1] = sum / self.window as f64;
        }

        // Roll the window forward
        for i in self.window..n {
            let leaving = values[i - self.window];
            let entering = values[i];
            sum = sum - leaving + entering;

            // Any undefined input poisons the running sum; rescan the window.
            if !entering.is_finite() || !leaving.is_finite() || nan_in_window {
                let window = &values[(i + 1 - self.window)..=i];
                nan_in_window = window.iter().any(|v| !v.is_finite());
                if nan_in_window {
                    continue;
                }
                sum = window.iter().sum();
            }

            result[i] = sum / self.window as f64;
        }

        result
    }
}

/// Trailing simple moving average of `series` with undefined points dropped.
///
/// A window longer than the series yields an empty series.
pub fn moving_average(series: &TimeSeries, window: usize) -> Result<TimeSeries, TransformError> {
    Ok(MovingAverage::new(window)?.apply(series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::{assert_approx, make_series, DEFAULT_EPSILON};

    #[test]
    fn ma_3_basic() {
        let ma = MovingAverage::new(3).unwrap();
        let result = ma.compute(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(result.len(), 5);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 2.0, DEFAULT_EPSILON);
        assert_approx(result[3], 3.0, DEFAULT_EPSILON);
        assert_approx(result[4], 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rising_prices_smooth_to_trailing_means() {
        let s = make_series(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let ma = moving_average(&s, 3).unwrap();
        assert_eq!(ma.values(), &[11.0, 12.0, 13.0]);
        assert_eq!(ma.dates(), &s.dates()[2..]);
        assert_eq!(ma.name(), "TEST_ma_3");
    }

    #[test]
    fn window_1_is_identity() {
        let ma = MovingAverage::new(1).unwrap();
        assert_eq!(ma.compute(&[100.0, 200.0, 300.0]), vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn zero_window_is_rejected() {
        assert_eq!(
            MovingAverage::new(0).unwrap_err(),
            TransformError::InvalidWindow(0)
        );
        assert!(moving_average(&make_series(&[1.0]), 0).is_err());
    }

    #[test]
    fn window_longer_than_series_is_empty() {
        let s = make_series(&[10.0, 11.0]);
        assert!(moving_average(&s, 5).unwrap().is_empty());
    }

    #[test]
    fn nan_inputs_poison_only_their_windows() {
        let ma = MovingAverage::new(3).unwrap();
        let result = ma.compute(&[10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0]);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn lookback() {
        assert_eq!(MovingAverage::new(20).unwrap().lookback(), 19);
        assert_eq!(MovingAverage::new(1).unwrap().lookback(), 0);
    }
}

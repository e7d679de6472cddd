//! One-step forecast adapter.
//!
//! Wraps any [`Forecaster`] behind a uniform contract: drop missing points,
//! soft-skip sparse series, fit, predict exactly one day past the last
//! observation, and hand back the last fitted row plus the new row.

use chrono::NaiveDate;

use super::{ForecastError, ForecastFit, ForecastResult, ForecasterFactory, Frequency};

/// Series with fewer usable points than this are skipped, not fitted.
pub const MIN_FORECAST_SAMPLES: usize = 10;

pub struct ForecastAdapter<'a> {
    factory: &'a dyn ForecasterFactory,
    min_samples: usize,
}

impl<'a> ForecastAdapter<'a> {
    pub fn new(factory: &'a dyn ForecasterFactory) -> Self {
        Self {
            factory,
            min_samples: MIN_FORECAST_SAMPLES,
        }
    }

    /// Override the minimum-sample guard.
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Forecast one day past the last usable observation of `name`.
    ///
    /// Returns `Ok(None)` when fewer than `min_samples` finite points remain;
    /// that is a soft skip and the caller decides how to report it.
    pub fn forecast_one_step(
        &self,
        dates: &[NaiveDate],
        values: &[f64],
        name: &str,
    ) -> Result<Option<ForecastResult>, ForecastError> {
        Ok(self.fit_one_step(dates, values, name)?.map(|fit| fit.result))
    }

    /// Like [`forecast_one_step`](Self::forecast_one_step), but keeps the full
    /// prediction and the observations it was fitted on, for charting.
    pub fn fit_one_step(
        &self,
        dates: &[NaiveDate],
        values: &[f64],
        name: &str,
    ) -> Result<Option<ForecastFit>, ForecastError> {
        if dates.len() != values.len() {
            return Err(ForecastError::LengthMismatch {
                dates: dates.len(),
                values: values.len(),
            });
        }

        let (dates, values): (Vec<NaiveDate>, Vec<f64>) = dates
            .iter()
            .zip(values)
            .filter(|(_, v)| v.is_finite())
            .map(|(d, v)| (*d, *v))
            .unzip();

        let Some(&last_date) = dates.last().filter(|_| values.len() >= self.min_samples) else {
            log::debug!(
                "not enough rows to forecast {name} ({} < {})",
                values.len(),
                self.min_samples
            );
            return Ok(None);
        };

        let mut model = self.factory.build();
        model.fit(&dates, &values)?;
        let rows = model.predict(1, Frequency::Daily)?;

        if rows.len() != dates.len() + 1 {
            return Err(ForecastError::MalformedPrediction(rows.len()));
        }
        let [last_fitted, next] = match rows.as_slice() {
            [.., a, b] => [*a, *b],
            _ => return Err(ForecastError::MalformedPrediction(rows.len())),
        };
        if last_fitted.date != last_date || next.date != last_date + Frequency::Daily.step() {
            return Err(ForecastError::MalformedPrediction(rows.len()));
        }

        log::debug!(
            "{name}: next {} yhat={:.4} [{:.4}, {:.4}]",
            next.date,
            next.yhat,
            next.yhat_lower,
            next.yhat_upper
        );

        Ok(Some(ForecastFit {
            result: ForecastResult {
                name: name.to_string(),
                last_fitted,
                next,
            },
            observed: values,
            rows,
        }))
    }
}

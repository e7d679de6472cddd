//! Named, date-indexed numeric series.
//!
//! A `TimeSeries` is immutable once built: every transform in this crate
//! produces a new series rather than editing one in place.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while constructing a series.
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("series '{name}': dates not strictly increasing at index {index} ({date})")]
    NonMonotonicDates {
        name: String,
        index: usize,
        date: NaiveDate,
    },

    #[error("series '{name}': {dates} dates but {values} values")]
    LengthMismatch {
        name: String,
        dates: usize,
        values: usize,
    },
}

/// An ordered sequence of `(date, value)` points for one instrument.
///
/// Dates are strictly increasing. Values may carry the NaN "undefined" marker
/// only transiently; see [`TimeSeries::drop_undefined`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Build a series, rejecting mismatched lengths and unordered or duplicate dates.
    pub fn new(
        name: impl Into<String>,
        dates: Vec<NaiveDate>,
        values: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        let name = name.into();
        if dates.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                name,
                dates: dates.len(),
                values: values.len(),
            });
        }
        if let Some(index) = dates.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SeriesError::NonMonotonicDates {
                date: dates[index + 1],
                index: index + 1,
                name,
            });
        }
        Ok(Self {
            name,
            dates,
            values,
        })
    }

    /// Build a series from `(date, value)` points that are already in order.
    pub fn from_points(
        name: impl Into<String>,
        points: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self, SeriesError> {
        let (dates, values) = points.into_iter().unzip();
        Self::new(name, dates, values)
    }

    /// An empty series with the given name.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dates: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Rebuild a series over a subset of an existing, already-ordered date axis.
    ///
    /// Only used internally where the ordering invariant is inherited.
    pub(crate) fn from_ordered_parts(name: String, dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        debug_assert!(dates.windows(2).all(|w| w[0] < w[1]));
        Self {
            name,
            dates,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Iterate over `(date, value)` points.
    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Pair this series' dates with freshly computed positional values and drop
    /// every point whose value is undefined (NaN or infinite).
    ///
    /// `values` must have the same length as the series.
    pub fn with_values(&self, name: impl Into<String>, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), self.len());
        let (dates, values) = self
            .dates
            .iter()
            .zip(values)
            .filter(|(_, v)| v.is_finite())
            .map(|(d, v)| (*d, v))
            .unzip();
        Self::from_ordered_parts(name.into(), dates, values)
    }

    /// A copy with every undefined (non-finite) point removed.
    pub fn drop_undefined(&self) -> Self {
        self.with_values(self.name.clone(), self.values.clone())
    }

    /// Arithmetic mean of the values, or `None` for an empty series.
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
        }
    }
}

//! An original series kept together with its filtered counterpart.

use chrono::NaiveDate;

use super::series::TimeSeries;
use crate::data::align::align;

/// `(original, filtered)` pair sharing exactly the same date axis.
///
/// The original is restricted to the dates on which the filtered series is
/// defined, so both halves always have equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPair {
    original: TimeSeries,
    filtered: TimeSeries,
}

impl SeriesPair {
    /// Pair two series, restricting both to their common dates.
    pub fn new(original: &TimeSeries, filtered: &TimeSeries) -> Self {
        let (original, filtered) = align(original, filtered);
        Self { original, filtered }
    }

    pub fn original(&self) -> &TimeSeries {
        &self.original
    }

    pub fn filtered(&self) -> &TimeSeries {
        &self.filtered
    }

    /// The shared date axis.
    pub fn dates(&self) -> &[NaiveDate] {
        self.original.dates()
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// Apply the same transform to both halves and re-pair the results.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(&TimeSeries) -> TimeSeries,
    {
        Self::new(&f(&self.original), &f(&self.filtered))
    }
}

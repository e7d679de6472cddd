//! Pairwise time alignment.
//!
//! Given two series, restrict both to the dates they share. Dates present in
//! only one series are dropped; nothing is forward-filled or interpolated.

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

use crate::domain::TimeSeries;

/// Restrict `a` and `b` to the intersection of their date sets.
///
/// Both outputs are in ascending date order, have equal length, and pair up
/// index by index. An empty intersection yields two empty series; callers
/// treat that as a no-op rather than a fault.
pub fn align(a: &TimeSeries, b: &TimeSeries) -> (TimeSeries, TimeSeries) {
    let b_dates: BTreeSet<NaiveDate> = b.dates().iter().copied().collect();
    let common: Vec<NaiveDate> = a
        .dates()
        .iter()
        .copied()
        .filter(|d| b_dates.contains(d))
        .collect();

    (restrict(a, &common), restrict(b, &common))
}

/// Date axis shared by every series in `series` (ascending).
pub fn common_dates<'a>(series: impl IntoIterator<Item = &'a TimeSeries>) -> Vec<NaiveDate> {
    let mut iter = series.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    let mut common: BTreeSet<NaiveDate> = first.dates().iter().copied().collect();
    for s in iter {
        let dates: BTreeSet<NaiveDate> = s.dates().iter().copied().collect();
        common = common.intersection(&dates).copied().collect();
    }
    common.into_iter().collect()
}

/// Keep only the points of `series` whose date appears in `dates` (ascending).
fn restrict(series: &TimeSeries, dates: &[NaiveDate]) -> TimeSeries {
    let lookup: HashMap<NaiveDate, f64> = series.points().collect();
    let values: Vec<f64> = dates
        .iter()
        .filter_map(|d| lookup.get(d).copied())
        .collect();
    TimeSeries::from_ordered_parts(series.name().to_string(), dates.to_vec(), values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(name: &str, days: &[u32], close: f64) -> TimeSeries {
        TimeSeries::from_points(
            name,
            days.iter().enumerate().map(|(i, d)| {
                (
                    NaiveDate::from_ymd_opt(2024, 1, *d).unwrap(),
                    close + i as f64,
                )
            }),
        )
        .unwrap()
    }

    #[test]
    fn align_keeps_only_shared_dates() {
        let a = series("SPY", &[1, 2, 3], 100.0);
        let b = series("QQQ", &[2, 3, 4], 200.0);

        let (a2, b2) = align(&a, &b);

        assert_eq!(a2.len(), 2);
        assert_eq!(b2.len(), 2);
        assert_eq!(a2.dates(), b2.dates());
        assert_eq!(a2.dates()[0], NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        // SPY on the 2nd and 3rd
        assert_eq!(a2.values(), &[101.0, 102.0]);
        // QQQ on the 2nd and 3rd
        assert_eq!(b2.values(), &[200.0, 201.0]);
    }

    #[test]
    fn disjoint_series_align_to_empty() {
        let a = series("SPY", &[1, 2], 100.0);
        let b = series("QQQ", &[5, 6], 200.0);
        let (a2, b2) = align(&a, &b);
        assert!(a2.is_empty());
        assert!(b2.is_empty());
        assert_eq!(a2.name(), "SPY");
    }

    #[test]
    fn identical_axes_are_unchanged() {
        let a = series("SPY", &[1, 2, 3], 100.0);
        let (a2, b2) = align(&a, &a);
        assert_eq!(a2, a);
        assert_eq!(b2, a);
    }

    #[test]
    fn common_dates_across_three() {
        let a = series("A", &[1, 2, 3, 4], 1.0);
        let b = series("B", &[2, 3, 4], 1.0);
        let c = series("C", &[3, 4, 5], 1.0);
        let common = common_dates([&a, &b, &c]);
        assert_eq!(common.len(), 2);
        assert!(common_dates(std::iter::empty::<&TimeSeries>()).is_empty());
    }
}

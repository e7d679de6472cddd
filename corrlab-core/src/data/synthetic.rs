//! Synthetic price universes for demos and tests.
//!
//! Each instrument is a weekday random walk driven by a shared market factor
//! plus its own idiosyncratic noise, so the series are correlated the way
//! real constituents of an index are. Seeds derive from BLAKE3 of the
//! instrument name, so the same name always yields the same path.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{SeriesUniverse, TimeSeries};

/// Seed used for the shared market factor.
const MARKET_SEED_KEY: &str = "__market__";

/// Generate a correlated synthetic universe over `[start, end]`, weekdays only.
///
/// Returns `None` if `reference` is not among `instruments`.
pub fn synthetic_universe(
    instruments: &[String],
    reference: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Option<SeriesUniverse> {
    let dates = weekdays(start, end);

    let mut market_rng = seeded_rng(MARKET_SEED_KEY);
    let market: Vec<f64> = dates
        .iter()
        .map(|_| market_rng.gen_range(-0.015..0.015))
        .collect();

    let series: BTreeMap<String, TimeSeries> = instruments
        .iter()
        .map(|name| {
            let mut rng = seeded_rng(name);
            let beta: f64 = rng.gen_range(0.6..1.4);
            let mut price = rng.gen_range(50.0..500.0_f64);
            let values: Vec<f64> = market
                .iter()
                .map(|m| {
                    let noise: f64 = rng.gen_range(-0.01..0.01);
                    price *= 1.0 + beta * m + noise;
                    price
                })
                .collect();
            let ts = TimeSeries::from_ordered_parts(name.clone(), dates.clone(), values);
            (name.clone(), ts)
        })
        .collect();

    SeriesUniverse::new(series, reference)
}

fn seeded_rng(key: &str) -> StdRng {
    let seed: [u8; 32] = *blake3::hash(key.as_bytes()).as_bytes();
    StdRng::from_seed(seed)
}

fn weekdays(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(current);
        }
        current += chrono::Duration::days(1);
    }
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["INDEX".into(), "AAA".into(), "BBB".into()]
    }

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
    }

    #[test]
    fn deterministic_per_name() {
        let (start, end) = range();
        let a = synthetic_universe(&names(), "INDEX", start, end).unwrap();
        let b = synthetic_universe(&names(), "INDEX", start, end).unwrap();
        assert_eq!(a.get("AAA"), b.get("AAA"));
    }

    #[test]
    fn skips_weekends_and_stays_positive() {
        let (start, end) = range();
        let u = synthetic_universe(&names(), "INDEX", start, end).unwrap();
        let s = u.get("BBB").unwrap();
        assert!(!s.is_empty());
        assert!(s
            .dates()
            .iter()
            .all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(s.values().iter().all(|v| *v > 0.0));
    }

    #[test]
    fn unknown_reference_is_none() {
        let (start, end) = range();
        assert!(synthetic_universe(&names(), "NOPE", start, end).is_none());
    }
}

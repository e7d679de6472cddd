//! Series universe: the set of instruments under analysis plus the
//! reference instrument that cross-correlations are measured against.

use std::collections::BTreeMap;

use super::series::TimeSeries;

/// Mapping from instrument name to its series, with one designated reference.
///
/// Instruments iterate in name order so every workflow visits them
/// deterministically.
#[derive(Debug, Clone)]
pub struct SeriesUniverse {
    series: BTreeMap<String, TimeSeries>,
    reference: String,
}

impl SeriesUniverse {
    /// Build a universe. Returns `None` when the reference is not a member.
    pub fn new(series: BTreeMap<String, TimeSeries>, reference: impl Into<String>) -> Option<Self> {
        let reference = reference.into();
        if !series.contains_key(&reference) {
            return None;
        }
        Some(Self { series, reference })
    }

    /// Name of the reference instrument.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// The reference instrument's series.
    pub fn reference_series(&self) -> &TimeSeries {
        // Membership is checked in `new` and the map is never mutated afterwards.
        &self.series[&self.reference]
    }

    pub fn get(&self, name: &str) -> Option<&TimeSeries> {
        self.series.get(name)
    }

    /// All instrument names, in name order.
    pub fn names(&self) -> Vec<&str> {
        self.series.keys().map(|s| s.as_str()).collect()
    }

    /// Iterate over `(name, series)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TimeSeries)> {
        self.series.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of instruments.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of points across every instrument.
    pub fn point_count(&self) -> usize {
        self.series.values().map(|s| s.len()).sum()
    }
}

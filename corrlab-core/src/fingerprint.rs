//! Dataset fingerprinting.
//!
//! A BLAKE3 hash over every instrument's dates and values, in name order, so
//! two analysis runs can be compared and tied back to the exact input data.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::SeriesUniverse;

/// Hex-encoded BLAKE3 hash of a universe's contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    /// Hash every instrument's name, dates and values.
    ///
    /// `SeriesUniverse` iterates in name order, so the hash does not depend
    /// on how the universe was assembled.
    pub fn of(universe: &SeriesUniverse) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(universe.reference().as_bytes());
        for (name, series) in universe.iter() {
            hasher.update(name.as_bytes());
            for (date, value) in series.points() {
                hasher.update(date.to_string().as_bytes());
                hasher.update(&value.to_le_bytes());
            }
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    /// First 12 hex characters, for display.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeSeries;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn universe(last: f64) -> SeriesUniverse {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let mut map = BTreeMap::new();
        map.insert(
            "A".to_string(),
            TimeSeries::new("A", vec![d(2), d(3)], vec![1.0, last]).unwrap(),
        );
        SeriesUniverse::new(map, "A").unwrap()
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(DatasetHash::of(&universe(2.0)), DatasetHash::of(&universe(2.0)));
        assert_eq!(DatasetHash::of(&universe(2.0)).0.len(), 64);
    }

    #[test]
    fn hash_changes_with_values() {
        assert_ne!(DatasetHash::of(&universe(2.0)), DatasetHash::of(&universe(2.5)));
    }

    #[test]
    fn short_form() {
        assert_eq!(DatasetHash::of(&universe(2.0)).short().len(), 12);
    }
}

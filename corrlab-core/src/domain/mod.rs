//! Domain types: series, series pairs and the instrument universe.

pub mod pair;
pub mod series;
pub mod universe;

pub use pair::SeriesPair;
pub use series::{SeriesError, TimeSeries};
pub use universe::SeriesUniverse;

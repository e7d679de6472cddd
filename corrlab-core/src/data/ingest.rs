//! CSV ingestion for wide price tables.
//!
//! Expected layout: one `Date` column (`YYYY-MM-DD`) plus one numeric column
//! per instrument. Rows where every configured instrument is empty are
//! dropped; a missing cell in one instrument only removes that point from
//! that instrument's series.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;

use super::DataError;
use crate::domain::{SeriesUniverse, TimeSeries};

/// Name of the date column.
pub const DATE_COLUMN: &str = "Date";

/// Accepted date formats, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"];

/// Cell contents treated as missing.
const MISSING_MARKERS: [&str; 5] = ["", "NA", "NaN", "nan", "null"];

/// Load the configured instruments from a CSV file.
pub fn load_csv_universe(
    path: &Path,
    instruments: &[String],
    reference: &str,
) -> Result<SeriesUniverse, DataError> {
    let file = std::fs::File::open(path).map_err(|e| DataError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let universe = read_csv_universe(file, instruments, reference)?;
    log::info!(
        "loaded {} instruments ({} points) from {}",
        universe.len(),
        universe.point_count(),
        path.display()
    );
    Ok(universe)
}

/// Load the configured instruments from any CSV reader.
///
/// Fails fast, before reading any rows, when the header lacks the date column
/// or any configured instrument; the error lists every missing instrument.
pub fn read_csv_universe<R: Read>(
    reader: R,
    instruments: &[String],
    reference: &str,
) -> Result<SeriesUniverse, DataError> {
    if !instruments.iter().any(|i| i == reference) {
        return Err(DataError::ReferenceNotInUniverse(reference.to_string()));
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column_index: HashMap<&str, usize> =
        headers.iter().enumerate().map(|(i, h)| (h, i)).collect();

    let date_idx = *column_index
        .get(DATE_COLUMN)
        .ok_or(DataError::MissingDateColumn)?;

    let missing: Vec<String> = instruments
        .iter()
        .filter(|name| !column_index.contains_key(name.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(DataError::MissingColumns(missing));
    }

    let instrument_idx: Vec<usize> = instruments
        .iter()
        .map(|name| column_index[name.as_str()])
        .collect();

    // date → one optional value per instrument
    let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    let mut dropped_empty = 0usize;

    for (row_no, record) in rdr.records().enumerate() {
        let record = record?;
        let line = row_no + 2; // 1-based, after the header

        let raw_date = record.get(date_idx).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| DataError::InvalidDate {
            line,
            value: raw_date.to_string(),
        })?;

        let cells = instrument_idx
            .iter()
            .zip(instruments)
            .map(|(&idx, name)| parse_cell(record.get(idx).unwrap_or(""), line, name))
            .collect::<Result<Vec<_>, _>>()?;

        if cells.iter().all(Option::is_none) {
            dropped_empty += 1;
            continue;
        }

        if rows.insert(date, cells).is_some() {
            return Err(DataError::DuplicateDate(date));
        }
    }

    if dropped_empty > 0 {
        log::debug!("dropped {dropped_empty} rows with no values for any instrument");
    }

    let mut series = BTreeMap::new();
    for (col, name) in instruments.iter().enumerate() {
        let points = rows
            .iter()
            .filter_map(|(date, cells)| cells[col].map(|v| (*date, v)));
        series.insert(name.clone(), TimeSeries::from_points(name.clone(), points)?);
    }

    SeriesUniverse::new(series, reference)
        .ok_or_else(|| DataError::ReferenceNotInUniverse(reference.to_string()))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn parse_cell(raw: &str, line: usize, column: &str) -> Result<Option<f64>, DataError> {
    if MISSING_MARKERS.contains(&raw) {
        return Ok(None);
    }
    let value: f64 = raw.parse().map_err(|_| DataError::InvalidValue {
        line,
        column: column.to_string(),
        value: raw.to_string(),
    })?;
    Ok(value.is_finite().then_some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    const SAMPLE: &str = "\
Date,NIFTY50,Reliance,Extra
2024-01-02,100.0,50.0,1
2024-01-03,101.0,,2
2024-01-04,,,3
2024-01-05,102.0,51.0,4
";

    #[test]
    fn loads_wide_table() {
        let u = read_csv_universe(SAMPLE.as_bytes(), &names(&["NIFTY50", "Reliance"]), "NIFTY50")
            .unwrap();
        assert_eq!(u.len(), 2);
        assert_eq!(u.reference(), "NIFTY50");
        // fully empty row on the 4th is dropped from both
        assert_eq!(u.get("NIFTY50").unwrap().values(), &[100.0, 101.0, 102.0]);
        // Reliance is also missing on the 3rd
        assert_eq!(u.get("Reliance").unwrap().values(), &[50.0, 51.0]);
    }

    #[test]
    fn missing_columns_are_all_listed() {
        let err = read_csv_universe(
            SAMPLE.as_bytes(),
            &names(&["NIFTY50", "Tata_Steel", "Finolex_Cables"]),
            "NIFTY50",
        )
        .unwrap_err();
        match err {
            DataError::MissingColumns(cols) => {
                assert_eq!(cols, names(&["Tata_Steel", "Finolex_Cables"]))
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn missing_date_column_is_fatal() {
        let csv = "Day,A\n2024-01-02,1.0\n";
        let err = read_csv_universe(csv.as_bytes(), &names(&["A"]), "A").unwrap_err();
        assert!(matches!(err, DataError::MissingDateColumn));
    }

    #[test]
    fn unsorted_rows_are_sorted() {
        let csv = "Date,A\n2024-01-03,2.0\n2024-01-02,1.0\n";
        let u = read_csv_universe(csv.as_bytes(), &names(&["A"]), "A").unwrap();
        assert_eq!(u.get("A").unwrap().values(), &[1.0, 2.0]);
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let csv = "Date,A\n2024-01-02,1.0\n2024-01-02,2.0\n";
        let err = read_csv_universe(csv.as_bytes(), &names(&["A"]), "A").unwrap_err();
        assert!(matches!(err, DataError::DuplicateDate(_)));
    }

    #[test]
    fn garbage_cell_reports_line_and_column() {
        let csv = "Date,A\n2024-01-02,1.0\n2024-01-03,abc\n";
        let err = read_csv_universe(csv.as_bytes(), &names(&["A"]), "A").unwrap_err();
        match err {
            DataError::InvalidValue { line, column, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "A");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn reference_outside_instruments_is_rejected() {
        let err = read_csv_universe(SAMPLE.as_bytes(), &names(&["Reliance"]), "NIFTY50")
            .unwrap_err();
        assert!(matches!(err, DataError::ReferenceNotInUniverse(_)));
    }
}

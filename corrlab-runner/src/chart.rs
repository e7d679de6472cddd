//! Visualization boundary.
//!
//! The orchestrator hands every chart's data to a [`ChartSink`] and never
//! looks at what the sink does with it. [`ArtifactSink`] writes one CSV per
//! chart so any plotting tool can render them; [`NullSink`] discards them.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use corrlab_core::forecast::ForecastFit;
use corrlab_core::stats::CorrelationFunction;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("chart '{title}': {reason}")]
    InvalidChart { title: String, reason: String },
}

/// Receiver for chart data. Presentation only.
pub trait ChartSink {
    /// Original and filtered series over a shared date axis.
    fn series_overlay(
        &mut self,
        dates: &[NaiveDate],
        original: &[f64],
        filtered: &[f64],
        title: &str,
        y_label: &str,
    ) -> Result<(), SinkError>;

    /// Side-by-side ACFs of the original and filtered series.
    fn acf_comparison(
        &mut self,
        original: &CorrelationFunction,
        filtered: &CorrelationFunction,
        title: &str,
    ) -> Result<(), SinkError>;

    /// Cross-correlation against the reference instrument.
    fn cross_correlation(&mut self, ccf: &CorrelationFunction, title: &str)
        -> Result<(), SinkError>;

    /// Observed values against the full fitted history, its interval band,
    /// and the one future row.
    fn forecast(&mut self, fit: &ForecastFit, title: &str) -> Result<(), SinkError>;
}

/// Discards every chart.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ChartSink for NullSink {
    fn series_overlay(
        &mut self,
        _dates: &[NaiveDate],
        _original: &[f64],
        _filtered: &[f64],
        _title: &str,
        _y_label: &str,
    ) -> Result<(), SinkError> {
        Ok(())
    }

    fn acf_comparison(
        &mut self,
        _original: &CorrelationFunction,
        _filtered: &CorrelationFunction,
        _title: &str,
    ) -> Result<(), SinkError> {
        Ok(())
    }

    fn cross_correlation(
        &mut self,
        _ccf: &CorrelationFunction,
        _title: &str,
    ) -> Result<(), SinkError> {
        Ok(())
    }

    fn forecast(&mut self, _fit: &ForecastFit, _title: &str) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Writes one CSV file per chart into a directory.
///
/// File names are slugs of the chart titles, e.g.
/// `"ACF Comparison - Reliance"` → `acf_comparison_reliance.csv`. Two titles
/// with the same slug are rejected rather than overwriting each other.
#[derive(Debug)]
pub struct ArtifactSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
    /// slug -> title that claimed it
    claimed: BTreeMap<String, String>,
}

impl ArtifactSink {
    /// Create the sink, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        Ok(Self {
            dir,
            written: Vec::new(),
            claimed: BTreeMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every file written so far, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_table<I>(&mut self, title: &str, header: &[&str], rows: I) -> Result<(), SinkError>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let name = slug(title);
        if name.is_empty() {
            return Err(SinkError::InvalidChart {
                title: title.to_string(),
                reason: "title has no usable file name characters".to_string(),
            });
        }
        if let Some(previous) = self.claimed.get(&name) {
            return Err(SinkError::InvalidChart {
                title: title.to_string(),
                reason: format!("{name}.csv was already written for '{previous}'"),
            });
        }
        let path = self.dir.join(format!("{name}.csv"));
        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record(header)?;
        for row in rows {
            wtr.write_record(&row)?;
        }
        wtr.flush().map_err(|e| io_error(&path, e))?;
        log::debug!("wrote {}", path.display());
        self.claimed.insert(name, title.to_string());
        self.written.push(path);
        Ok(())
    }
}

impl ChartSink for ArtifactSink {
    fn series_overlay(
        &mut self,
        dates: &[NaiveDate],
        original: &[f64],
        filtered: &[f64],
        title: &str,
        y_label: &str,
    ) -> Result<(), SinkError> {
        if dates.len() != original.len() || dates.len() != filtered.len() {
            return Err(SinkError::InvalidChart {
                title: title.to_string(),
                reason: format!(
                    "{} dates, {} original, {} filtered",
                    dates.len(),
                    original.len(),
                    filtered.len()
                ),
            });
        }
        let original_col = format!("{y_label} (original)");
        let filtered_col = format!("{y_label} (filtered)");
        let rows = dates
            .iter()
            .zip(original.iter().zip(filtered))
            .map(|(d, (o, f))| vec![d.to_string(), format!("{o:.6}"), format!("{f:.6}")]);
        self.write_table(title, &["date", &original_col, &filtered_col], rows)
    }

    fn acf_comparison(
        &mut self,
        original: &CorrelationFunction,
        filtered: &CorrelationFunction,
        title: &str,
    ) -> Result<(), SinkError> {
        let longest = original.max_lag().max(filtered.max_lag());
        let cell = |cf: &CorrelationFunction, lag: i64| {
            cf.get(lag).map(|v| format!("{v:.6}")).unwrap_or_default()
        };
        let rows = (0..=longest)
            .map(|lag| vec![lag.to_string(), cell(original, lag), cell(filtered, lag)]);
        self.write_table(title, &["lag", "acf_original", "acf_filtered"], rows)
    }

    fn cross_correlation(
        &mut self,
        ccf: &CorrelationFunction,
        title: &str,
    ) -> Result<(), SinkError> {
        let rows = ccf
            .iter()
            .map(|(lag, v)| vec![lag.to_string(), format!("{v:.6}")]);
        self.write_table(title, &["lag", "ccf"], rows)
    }

    fn forecast(&mut self, fit: &ForecastFit, title: &str) -> Result<(), SinkError> {
        if fit.rows.len() != fit.observed.len() + 1 {
            return Err(SinkError::InvalidChart {
                title: title.to_string(),
                reason: format!(
                    "{} predicted rows for {} observations",
                    fit.rows.len(),
                    fit.observed.len()
                ),
            });
        }
        let rows = fit.history().map(|(r, observed)| {
            vec![
                r.date.to_string(),
                observed.map(|v| format!("{v:.6}")).unwrap_or_default(),
                format!("{:.6}", r.yhat),
                format!("{:.6}", r.yhat_lower),
                format!("{:.6}", r.yhat_upper),
            ]
        });
        self.write_table(
            title,
            &["date", "observed", "yhat", "yhat_lower", "yhat_upper"],
            rows,
        )
    }
}

/// Lowercase ASCII slug: runs of non-alphanumerics collapse to one `_`.
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

fn io_error(path: &Path, source: std::io::Error) -> SinkError {
    SinkError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corrlab_core::forecast::{AdditiveModelConfig, ForecastAdapter};
    use corrlab_core::stats::{acf, ccf};

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slug("ACF Comparison - Reliance"), "acf_comparison_reliance");
        assert_eq!(
            slug("CCF (Returns) - Filtered_Return_A vs Filtered_Return_B"),
            "ccf_returns_filtered_return_a_vs_filtered_return_b"
        );
        assert_eq!(slug("  --  "), "");
    }

    #[test]
    fn artifact_sink_writes_one_csv_per_chart() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ArtifactSink::new(dir.path().join("charts")).unwrap();

        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        sink.series_overlay(&[d], &[1.0], &[1.5], "A - Price vs Filtered", "Adjusted Close")
            .unwrap();

        let x = [1.0, 3.0, 2.0, 5.0, 4.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        let a = acf(&x, 2).unwrap();
        let b = acf(&y, 1).unwrap();
        sink.acf_comparison(&a, &b, "ACF Comparison - A").unwrap();
        sink.cross_correlation(&ccf(&x, &y, 2).unwrap(), "CCF - A vs B")
            .unwrap();

        assert_eq!(sink.written().len(), 3);
        let acf_csv = std::fs::read_to_string(sink.dir().join("acf_comparison_a.csv")).unwrap();
        let lines: Vec<&str> = acf_csv.lines().collect();
        assert_eq!(lines[0], "lag,acf_original,acf_filtered");
        assert_eq!(lines.len(), 4);
        // filtered ACF stops at lag 1
        assert!(lines[3].ends_with(','));

        let ccf_csv = std::fs::read_to_string(sink.dir().join("ccf_a_vs_b.csv")).unwrap();
        assert_eq!(ccf_csv.lines().count(), 6);
        assert!(ccf_csv.lines().nth(1).unwrap().starts_with("-2,"));
    }

    #[test]
    fn forecast_table_covers_history_and_next_day() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ArtifactSink::new(dir.path()).unwrap();

        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..30).map(|i| base + chrono::Duration::days(i)).collect();
        let values: Vec<f64> = (0..30).map(|i| 50.0 + i as f64 * 0.5).collect();
        let factory = AdditiveModelConfig::default();
        let fit = ForecastAdapter::new(&factory)
            .fit_one_step(&dates, &values, "Price - A")
            .unwrap()
            .unwrap();
        sink.forecast(&fit, "Forecast - Price - A").unwrap();

        let csv = std::fs::read_to_string(dir.path().join("forecast_price_a.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,observed,yhat,yhat_lower,yhat_upper");
        assert_eq!(lines.len(), 1 + 30 + 1);
        assert!(lines[1].starts_with("2024-01-01,50.000000,"));
        // the future row has no observation
        assert!(lines[31].starts_with("2024-01-31,,"));
    }

    #[test]
    fn colliding_titles_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ArtifactSink::new(dir.path()).unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        sink.series_overlay(&[d], &[1.0], &[1.0], "Tata-Steel - Price vs Filtered", "v")
            .unwrap();
        let err = sink
            .series_overlay(&[d], &[2.0], &[2.0], "tata_steel - Price vs Filtered", "v")
            .unwrap_err();
        assert!(matches!(err, SinkError::InvalidChart { .. }));
        assert_eq!(sink.written().len(), 1);

        let csv = std::fs::read_to_string(&sink.written()[0]).unwrap();
        assert!(csv.contains("1.000000"));
    }

    #[test]
    fn unnamed_chart_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ArtifactSink::new(dir.path()).unwrap();
        let cf = acf(&[1.0, 2.0, 4.0], 1).unwrap();
        assert!(matches!(
            sink.cross_correlation(&cf, " - "),
            Err(SinkError::InvalidChart { .. })
        ));
    }

    #[test]
    fn overlay_rejects_ragged_columns() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ArtifactSink::new(dir.path()).unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let err = sink
            .series_overlay(&[d], &[1.0, 2.0], &[1.0], "bad", "v")
            .unwrap_err();
        assert!(matches!(err, SinkError::InvalidChart { .. }));
    }
}

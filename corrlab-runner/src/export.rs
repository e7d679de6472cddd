//! Reporting and export: JSON, CSV, and Markdown artifacts.
//!
//! - **JSON**: the full `AnalysisReport`, round-trippable, schema-versioned
//! - **CSV**: one row per forecast row across both workflows
//! - **Markdown**: human-readable run summary
//!
//! Unknown (newer) schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::analysis::{AnalysisReport, SCHEMA_VERSION};
use crate::workflow::WorkflowReport;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisReport` to pretty JSON.
pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Deserialize an `AnalysisReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export every forecast as CSV.
///
/// Columns: workflow, instrument, row, date, yhat, yhat_lower, yhat_upper.
/// `row` is `last_fitted` or `forecast`.
pub fn export_forecasts_csv(report: &AnalysisReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "workflow",
        "instrument",
        "row",
        "date",
        "yhat",
        "yhat_lower",
        "yhat_upper",
    ])?;

    for workflow in [&report.price, &report.returns] {
        for f in &workflow.forecasts {
            let fc = &f.forecast;
            for (kind, row) in [("last_fitted", &fc.last_fitted), ("forecast", &fc.next)] {
                wtr.write_record([
                    workflow.level.clone(),
                    f.instrument.clone(),
                    kind.to_string(),
                    row.date.to_string(),
                    format!("{:.6}", row.yhat),
                    format!("{:.6}", row.yhat_lower),
                    format!("{:.6}", row.yhat_upper),
                ])?;
            }
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for a run.
///
/// Creates a directory named `{dataset_hash_prefix}_{timestamp}/` under
/// `output_dir` containing:
/// - `manifest.json`: the full `AnalysisReport`
/// - `forecasts.csv`: forecast rows from both workflows
/// - `summary.md`: Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &AnalysisReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        report.dataset_hash.short(),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("manifest.json"), export_json(report)?)?;
    std::fs::write(run_dir.join("forecasts.csv"), export_forecasts_csv(report)?)?;
    std::fs::write(run_dir.join("summary.md"), generate_summary(report))?;

    log::info!("artifacts written to {}", run_dir.display());
    Ok(run_dir)
}

/// Load an `AnalysisReport` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<AnalysisReport> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown summary ───────────────────────────────────────────────

/// Generate a Markdown summary of a run.
pub fn generate_summary(report: &AnalysisReport) -> String {
    let mut md = String::with_capacity(2048);
    let cfg = &report.config;

    md.push_str("# Correlation Analysis\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Instruments | {} |\n", cfg.instruments.join(", ")));
    md.push_str(&format!("| Reference | {} |\n", cfg.reference));
    md.push_str(&format!("| MA Window | {} |\n", cfg.ma_window));
    md.push_str(&format!("| Max Lag | {} |\n", cfg.max_lag));
    if let (Some(first), Some(last)) = (report.coverage.first_common, report.coverage.last_common)
    {
        md.push_str(&format!(
            "| Common Period | {first} to {last} ({} dates) |\n",
            report.coverage.common_dates
        ));
    }
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    if report.synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    push_workflow(&mut md, "Price Workflow", &report.price);
    push_workflow(&mut md, "Return Workflow", &report.returns);
    md
}

fn push_workflow(md: &mut String, heading: &str, w: &WorkflowReport) {
    md.push_str(&format!("## {heading}\n\n"));

    md.push_str("### Autocorrelation (lag 1)\n\n");
    md.push_str("| Instrument | Points | Original | Filtered |\n");
    md.push_str("| --- | ---: | ---: | ---: |\n");
    for s in &w.instruments {
        let lag1 = |cf: &Option<corrlab_core::stats::CorrelationFunction>| {
            cf.as_ref()
                .and_then(|cf| cf.get(1))
                .map(|v| format!("{v:.3}"))
                .unwrap_or_else(|| "-".to_string())
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            s.instrument,
            s.points,
            lag1(&s.acf_original),
            lag1(&s.acf_filtered)
        ));
    }
    md.push('\n');

    if !w.cross_correlations.is_empty() {
        md.push_str("### Cross-Correlation vs Reference\n\n");
        md.push_str("| Instrument | Points | Lag 0 | Peak Lag | Peak |\n");
        md.push_str("| --- | ---: | ---: | ---: | ---: |\n");
        for c in &w.cross_correlations {
            let lag0 = c.ccf.get(0).unwrap_or(f64::NAN);
            md.push_str(&format!(
                "| {} | {} | {:.3} | {} | {:.3} |\n",
                c.instrument, c.points, lag0, c.peak_lag, c.peak_value
            ));
        }
        md.push('\n');
    }

    if !w.forecasts.is_empty() {
        md.push_str("### One-Step Forecasts\n\n");
        md.push_str("| Series | Date | yhat | Lower | Upper |\n");
        md.push_str("| --- | --- | ---: | ---: | ---: |\n");
        for f in &w.forecasts {
            let (name, next) = (&f.forecast.name, &f.forecast.next);
            md.push_str(&format!(
                "| {} | {} | {:.4} | {:.4} | {:.4} |\n",
                name, next.date, next.yhat, next.yhat_lower, next.yhat_upper
            ));
        }
        md.push('\n');
    }

    if !w.skipped.is_empty() {
        md.push_str("### Skipped\n\n");
        for s in &w.skipped {
            md.push_str(&format!("- {} ({:?}): {}\n", s.instrument, s.stage, s.reason));
        }
        md.push('\n');
    }
}

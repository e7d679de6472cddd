//! CorrLab CLI: correlation analysis of instrument price tables.
//!
//! Commands:
//! - `analyze`: run the price and return workflows and save artifacts
//! - `acf`: print the autocorrelation of a single instrument
//! - `init-config`: write the default analysis config as TOML

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use corrlab_core::data::load_csv_universe;
use corrlab_core::stats::{acf, clamp_max_lag};
use corrlab_core::transforms::{moving_average, pct_change};
use corrlab_runner::export::save_artifacts;
use corrlab_runner::{
    load_universe, run_analysis, AnalysisConfig, AnalysisReport, ArtifactSink, ChartSink,
    DataSource, NullSink, WorkflowReport,
};

#[derive(Parser)]
#[command(
    name = "corrlab",
    about = "CorrLab CLI: smoothing, autocorrelation and lead/lag analysis of price series"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the price and return workflows over a universe of instruments.
    Analyze {
        /// Path to a TOML config file. Defaults to the built-in universe.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Wide CSV price table (Date column plus one column per instrument).
        #[arg(long)]
        data: Option<PathBuf>,

        /// Use synthetic random-walk data instead of a CSV.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Synthetic start date (YYYY-MM-DD). Defaults to 2 years ago.
        #[arg(long)]
        start: Option<String>,

        /// Synthetic end date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Override the moving-average window.
        #[arg(long)]
        window: Option<usize>,

        /// Override the maximum ACF/CCF lag.
        #[arg(long)]
        max_lag: Option<usize>,

        /// Fit forecasts on all cores.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Skip writing per-chart CSV tables.
        #[arg(long, default_value_t = false)]
        no_charts: bool,

        /// Output directory for reports and chart tables.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Print the autocorrelation of one instrument.
    Acf {
        /// Wide CSV price table.
        #[arg(long)]
        data: PathBuf,

        /// Instrument column.
        #[arg(long)]
        instrument: String,

        /// Maximum lag (clamped to the series length).
        #[arg(long, default_value_t = 60)]
        max_lag: usize,

        /// Smooth with this moving-average window first.
        #[arg(long)]
        window: Option<usize>,

        /// Use daily returns instead of levels.
        #[arg(long, default_value_t = false)]
        returns: bool,
    },
    /// Write the default analysis config.
    InitConfig {
        /// Destination file.
        #[arg(long, default_value = "corrlab.toml")]
        output: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            config,
            data,
            synthetic,
            start,
            end,
            window,
            max_lag,
            parallel,
            no_charts,
            output_dir,
        } => run_analyze_cmd(
            config, data, synthetic, start, end, window, max_lag, parallel, no_charts, output_dir,
        ),
        Commands::Acf {
            data,
            instrument,
            max_lag,
            window,
            returns,
        } => run_acf_cmd(&data, &instrument, max_lag, window, returns),
        Commands::InitConfig { output, force } => run_init_config(&output, force),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_analyze_cmd(
    config_path: Option<PathBuf>,
    data: Option<PathBuf>,
    synthetic: bool,
    start: Option<String>,
    end: Option<String>,
    window: Option<usize>,
    max_lag: Option<usize>,
    parallel: bool,
    no_charts: bool,
    output_dir: PathBuf,
) -> Result<()> {
    if data.is_some() && synthetic {
        bail!("--data and --synthetic are mutually exclusive");
    }

    let mut config = match config_path {
        Some(path) => AnalysisConfig::from_file(&path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(w) = window {
        config.ma_window = w;
    }
    if let Some(lag) = max_lag {
        config.max_lag = lag;
    }
    config.parallel_forecasts |= parallel;
    config.validate()?;

    let source = match data {
        Some(path) => DataSource::Csv(path),
        None if synthetic => {
            let end_date = parse_date(end.as_deref())?
                .unwrap_or_else(|| chrono::Local::now().date_naive());
            let start_date = parse_date(start.as_deref())?
                .unwrap_or_else(|| end_date - chrono::Duration::days(365 * 2));
            if start_date >= end_date {
                bail!("--start must be before --end");
            }
            DataSource::Synthetic {
                start: start_date,
                end: end_date,
            }
        }
        None => bail!("one of --data or --synthetic is required"),
    };

    let loaded = load_universe(&config, &source)?;
    let factory = config.forecast.model_config();

    let mut artifact_sink;
    let mut null_sink = NullSink;
    let sink: &mut dyn ChartSink = if no_charts {
        &mut null_sink
    } else {
        artifact_sink = ArtifactSink::new(output_dir.join("charts"))?;
        &mut artifact_sink
    };

    let report = run_analysis(&loaded, &config, &factory, sink)?;
    print_summary(&report);

    let run_dir = save_artifacts(&report, &output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}

fn run_acf_cmd(
    data: &Path,
    instrument: &str,
    max_lag: usize,
    window: Option<usize>,
    returns: bool,
) -> Result<()> {
    let instruments = vec![instrument.to_string()];
    let universe = load_csv_universe(data, &instruments, instrument)?;
    let mut series = universe.reference_series().clone();

    if let Some(w) = window {
        series = moving_average(&series, w)?;
    }
    if returns {
        series = pct_change(&series);
    }

    let Some(lag) = clamp_max_lag(max_lag, series.len()) else {
        bail!("{} has no data points", series.name());
    };
    let r = acf(series.values(), lag).with_context(|| format!("acf of {}", series.name()))?;

    println!("ACF of {} ({} points)", series.name(), series.len());
    println!("{:>5}  {:>8}", "lag", "acf");
    for (lag, v) in r.iter() {
        println!("{lag:>5}  {v:>8.4}");
    }
    Ok(())
}

fn run_init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }
    let toml = AnalysisConfig::default().to_toml()?;
    std::fs::write(output, toml)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote default config to {}", output.display());
    Ok(())
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
    })
    .transpose()
}

fn print_summary(report: &AnalysisReport) {
    println!();
    println!("=== Correlation Analysis ===");
    println!(
        "Dataset: {}{}",
        report.dataset_hash.short(),
        if report.synthetic { " (SYNTHETIC)" } else { "" }
    );
    println!(
        "Common dates: {} | window {} | max lag {}",
        report.coverage.common_dates, report.config.ma_window, report.config.max_lag
    );
    print_workflow("Price", &report.price);
    print_workflow("Returns", &report.returns);
}

fn print_workflow(heading: &str, w: &WorkflowReport) {
    println!();
    println!("--- {heading} ---");
    for c in &w.cross_correlations {
        println!(
            "  {:<24} vs {:<10} peak {:>7.4} at lag {:>4}",
            c.instrument, c.reference, c.peak_value, c.peak_lag
        );
    }
    for f in &w.forecasts {
        println!("  1-step forecast for {}:", f.forecast.name);
        for row in [&f.forecast.last_fitted, &f.forecast.next] {
            println!(
                "    {}  yhat {:>12.4}  [{:.4}, {:.4}]",
                row.date, row.yhat, row.yhat_lower, row.yhat_upper
            );
        }
    }
    for s in &w.skipped {
        println!("  skipped {} ({:?}): {}", s.instrument, s.stage, s.reason);
    }
}

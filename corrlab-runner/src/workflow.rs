//! The analysis workflow: smoothing, ACF comparison, cross-correlation
//! against the reference instrument, and one-step forecasts.
//!
//! There is exactly one workflow. The price and return analyses are the same
//! steps run through a different [`PairTransform`].

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use corrlab_core::data::align;
use corrlab_core::domain::{SeriesPair, SeriesUniverse};
use corrlab_core::forecast::{ForecastAdapter, ForecastError, ForecastResult, ForecasterFactory};
use corrlab_core::stats::{acf, ccf, clamp_max_lag, CorrelationFunction, StatsError};
use corrlab_core::transforms::{moving_average, pct_change, TransformError};

use crate::chart::{ChartSink, SinkError};
use crate::config::AnalysisConfig;

/// Errors that abort a workflow. Everything else becomes a [`SkipNotice`].
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("transform: {0}")]
    Transform(#[from] TransformError),

    #[error("forecast {instrument}: {source}")]
    Forecast {
        instrument: String,
        #[source]
        source: ForecastError,
    },

    #[error("chart sink: {0}")]
    Sink(#[from] SinkError),
}

/// The per-workflow step applied to every `(original, filtered)` pair, plus
/// the labels its charts carry.
pub trait PairTransform: Send + Sync {
    /// Short workflow label, e.g. `"price"`.
    fn label(&self) -> &'static str;

    fn transform(&self, pair: &SeriesPair) -> SeriesPair;

    fn y_label(&self) -> &'static str;

    fn overlay_title(&self, instrument: &str) -> String;

    fn acf_title(&self, instrument: &str) -> String;

    fn ccf_title(&self, instrument: &str, reference: &str) -> String;

    fn forecast_name(&self, instrument: &str) -> String;
}

/// Price levels: the moving-average pairs as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceLevel;

impl PairTransform for PriceLevel {
    fn label(&self) -> &'static str {
        "price"
    }

    fn transform(&self, pair: &SeriesPair) -> SeriesPair {
        pair.clone()
    }

    fn y_label(&self) -> &'static str {
        "Adjusted Close"
    }

    fn overlay_title(&self, instrument: &str) -> String {
        format!("{instrument} - Price vs Filtered")
    }

    fn acf_title(&self, instrument: &str) -> String {
        format!("ACF Comparison - {instrument}")
    }

    fn ccf_title(&self, instrument: &str, reference: &str) -> String {
        format!("CCF - Filtered {instrument} vs Filtered {reference}")
    }

    fn forecast_name(&self, instrument: &str) -> String {
        format!("Price - {instrument}")
    }
}

/// Daily returns of both the original and the filtered series.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnLevel;

impl PairTransform for ReturnLevel {
    fn label(&self) -> &'static str {
        "return"
    }

    fn transform(&self, pair: &SeriesPair) -> SeriesPair {
        pair.map(pct_change)
    }

    fn y_label(&self) -> &'static str {
        "Daily Return"
    }

    fn overlay_title(&self, instrument: &str) -> String {
        format!("{instrument} - Return vs Filtered Return")
    }

    fn acf_title(&self, instrument: &str) -> String {
        format!("ACF Comparison (Returns) - {instrument}")
    }

    fn ccf_title(&self, instrument: &str, reference: &str) -> String {
        format!("CCF (Returns) - Filtered_Return_{instrument} vs Filtered_Return_{reference}")
    }

    fn forecast_name(&self, instrument: &str) -> String {
        format!("Return - {instrument}")
    }
}

/// Workflow step at which an instrument was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Acf,
    Ccf,
    Forecast,
}

/// Why an instrument was skipped at a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// No points left after smoothing and transformation.
    EmptySeries,
    /// The instrument and the reference share no dates.
    EmptyAlignment,
    InsufficientData { required: usize, actual: usize },
    ZeroVariance,
    /// The forecasting model failed numerically.
    ModelFailure { message: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptySeries => write!(f, "empty series"),
            SkipReason::EmptyAlignment => write!(f, "no dates in common with the reference"),
            SkipReason::InsufficientData { required, actual } => {
                write!(f, "not enough rows ({actual} < {required})")
            }
            SkipReason::ZeroVariance => write!(f, "zero variance"),
            SkipReason::ModelFailure { message } => write!(f, "model failure: {message}"),
        }
    }
}

impl From<StatsError> for SkipReason {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::InsufficientData { required, actual } => {
                SkipReason::InsufficientData { required, actual }
            }
            StatsError::ZeroVariance => SkipReason::ZeroVariance,
            // aligned inputs never differ in length
            StatsError::LengthMismatch { .. } => SkipReason::EmptyAlignment,
        }
    }
}

/// A non-fatal skip, recorded in the report and logged at `warn`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipNotice {
    pub instrument: String,
    pub stage: Stage,
    pub reason: SkipReason,
}

/// ACF comparison for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSummary {
    pub instrument: String,
    pub points: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub acf_original: Option<CorrelationFunction>,
    pub acf_filtered: Option<CorrelationFunction>,
}

/// Cross-correlation of one instrument's filtered series against the
/// reference's filtered series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossCorrelationSummary {
    pub instrument: String,
    pub reference: String,
    /// Number of aligned points the CCF was computed from.
    pub points: usize,
    /// Lag with the largest absolute coefficient.
    pub peak_lag: i64,
    pub peak_value: f64,
    pub ccf: CorrelationFunction,
}

/// One instrument's forecast. `forecast.name` carries the workflow label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentForecast {
    pub instrument: String,
    pub forecast: ForecastResult,
}

/// Everything one workflow produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowReport {
    pub level: String,
    pub instruments: Vec<InstrumentSummary>,
    pub cross_correlations: Vec<CrossCorrelationSummary>,
    /// Sorted by instrument name.
    pub forecasts: Vec<InstrumentForecast>,
    pub skipped: Vec<SkipNotice>,
}

impl WorkflowReport {
    fn new(level: &str) -> Self {
        Self {
            level: level.to_string(),
            instruments: Vec::new(),
            cross_correlations: Vec::new(),
            forecasts: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn skip(&mut self, instrument: &str, stage: Stage, reason: SkipReason) {
        log::warn!("{} {instrument}: skipping {stage:?}: {reason}", self.level);
        self.skipped.push(SkipNotice {
            instrument: instrument.to_string(),
            stage,
            reason,
        });
    }

    pub fn forecast_for(&self, instrument: &str) -> Option<&ForecastResult> {
        self.forecasts
            .iter()
            .find(|f| f.instrument == instrument)
            .map(|f| &f.forecast)
    }

    pub fn cross_correlation_for(&self, instrument: &str) -> Option<&CrossCorrelationSummary> {
        self.cross_correlations
            .iter()
            .find(|c| c.instrument == instrument)
    }
}

/// Smooth every instrument and pair it with its filtered counterpart.
///
/// Pairs come back in instrument-name order.
pub fn build_pairs(
    universe: &SeriesUniverse,
    window: usize,
) -> Result<Vec<(String, SeriesPair)>, TransformError> {
    universe
        .iter()
        .map(|(name, series)| {
            let filtered = moving_average(series, window)?;
            Ok((name.to_string(), SeriesPair::new(series, &filtered)))
        })
        .collect()
}

/// Run one workflow over the whole universe.
pub fn run_workflow<T, S>(
    universe: &SeriesUniverse,
    config: &AnalysisConfig,
    transform: &T,
    factory: &dyn ForecasterFactory,
    sink: &mut S,
) -> Result<WorkflowReport, WorkflowError>
where
    T: PairTransform + ?Sized,
    S: ChartSink + ?Sized,
{
    let level = transform.label();
    log::info!(
        "{level} workflow: {} instruments, window {}, max lag {}",
        universe.len(),
        config.ma_window,
        config.max_lag
    );

    let pairs: Vec<(String, SeriesPair)> = build_pairs(universe, config.ma_window)?
        .into_iter()
        .map(|(name, pair)| {
            let transformed = transform.transform(&pair);
            (name, transformed)
        })
        .collect();

    let mut report = WorkflowReport::new(level);

    // Overlay and ACF comparison per instrument.
    for (name, pair) in &pairs {
        let original = pair.original();
        let filtered = pair.filtered();
        let mut summary = InstrumentSummary {
            instrument: name.clone(),
            points: pair.len(),
            first_date: original.first_date(),
            last_date: original.last_date(),
            acf_original: None,
            acf_filtered: None,
        };

        let Some(max_lag) = clamp_max_lag(config.max_lag, pair.len()) else {
            report.skip(name, Stage::Acf, SkipReason::EmptySeries);
            report.instruments.push(summary);
            continue;
        };

        sink.series_overlay(
            pair.dates(),
            original.values(),
            filtered.values(),
            &transform.overlay_title(name),
            transform.y_label(),
        )?;

        match (acf(original.values(), max_lag), acf(filtered.values(), max_lag)) {
            (Ok(a), Ok(b)) => {
                log::debug!(
                    "{level} {name}: acf lag1 original={:.4} filtered={:.4}",
                    a.get(1).unwrap_or(f64::NAN),
                    b.get(1).unwrap_or(f64::NAN)
                );
                sink.acf_comparison(&a, &b, &transform.acf_title(name))?;
                summary.acf_original = Some(a);
                summary.acf_filtered = Some(b);
            }
            (Err(e), _) | (_, Err(e)) => report.skip(name, Stage::Acf, e.into()),
        }
        report.instruments.push(summary);
    }

    // Cross-correlation against the reference.
    let reference = universe.reference();
    if let Some((_, reference_pair)) = pairs.iter().find(|(n, _)| n == reference) {
        for (name, pair) in pairs.iter().filter(|(n, _)| n != reference) {
            let (x, y) = align(pair.filtered(), reference_pair.filtered());
            let Some(max_lag) = clamp_max_lag(config.max_lag, x.len()) else {
                report.skip(name, Stage::Ccf, SkipReason::EmptyAlignment);
                continue;
            };
            match ccf(x.values(), y.values(), max_lag) {
                Ok(cf) => {
                    let (peak_lag, peak_value) = cf.peak().unwrap_or((0, 0.0));
                    log::debug!(
                        "{level} {name} vs {reference}: {} points, peak {peak_value:.4} at lag {peak_lag}",
                        x.len()
                    );
                    sink.cross_correlation(&cf, &transform.ccf_title(name, reference))?;
                    report.cross_correlations.push(CrossCorrelationSummary {
                        instrument: name.clone(),
                        reference: reference.to_string(),
                        points: x.len(),
                        peak_lag,
                        peak_value,
                        ccf: cf,
                    });
                }
                Err(e) => report.skip(name, Stage::Ccf, e.into()),
            }
        }
    }

    // One-step forecasts on the original half of each pair.
    let adapter = ForecastAdapter::new(factory).with_min_samples(config.forecast.min_samples);
    let run_one = |(name, pair): &(String, SeriesPair)| {
        let original = pair.original();
        let outcome = adapter.fit_one_step(
            original.dates(),
            original.values(),
            &transform.forecast_name(name),
        );
        (name.clone(), pair.len(), outcome)
    };
    let outcomes: Vec<_> = if config.parallel_forecasts {
        pairs.par_iter().map(run_one).collect()
    } else {
        pairs.iter().map(run_one).collect()
    };

    for (name, points, outcome) in outcomes {
        match outcome {
            Ok(Some(fit)) => {
                sink.forecast(&fit, &format!("Forecast - {}", fit.result.name))?;
                report.forecasts.push(InstrumentForecast {
                    instrument: name,
                    forecast: fit.result,
                });
            }
            Ok(None) => report.skip(
                &name,
                Stage::Forecast,
                SkipReason::InsufficientData {
                    required: adapter.min_samples(),
                    actual: points,
                },
            ),
            Err(ForecastError::InsufficientData { required, actual }) => report.skip(
                &name,
                Stage::Forecast,
                SkipReason::InsufficientData { required, actual },
            ),
            Err(ForecastError::NumericalError(message)) => {
                report.skip(&name, Stage::Forecast, SkipReason::ModelFailure { message })
            }
            Err(source) => {
                return Err(WorkflowError::Forecast {
                    instrument: name,
                    source,
                })
            }
        }
    }

    log::info!(
        "{level} workflow done: {} acf, {} ccf, {} forecasts, {} skipped",
        report.instruments.iter().filter(|i| i.acf_original.is_some()).count(),
        report.cross_correlations.len(),
        report.forecasts.len(),
        report.skipped.len()
    );
    Ok(report)
}

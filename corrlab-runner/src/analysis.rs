//! Analysis entry point: load the universe, run the price and return
//! workflows, and bundle both reports with their provenance.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use corrlab_core::data::{common_dates, load_csv_universe, synthetic_universe, DataError};
use corrlab_core::domain::SeriesUniverse;
use corrlab_core::fingerprint::DatasetHash;
use corrlab_core::forecast::ForecasterFactory;

use crate::chart::ChartSink;
use crate::config::{AnalysisConfig, ConfigError};
use crate::workflow::{run_workflow, PriceLevel, ReturnLevel, WorkflowError, WorkflowReport};

/// Current report schema version. Bump on breaking changes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("data: {0}")]
    Data(#[from] DataError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

/// Where the price table comes from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Wide CSV: a `Date` column plus one column per instrument.
    Csv(PathBuf),
    /// Deterministic random walks, tagged as synthetic in the report.
    Synthetic { start: NaiveDate, end: NaiveDate },
}

/// A loaded universe with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedUniverse {
    pub universe: SeriesUniverse,
    pub dataset_hash: DatasetHash,
    pub synthetic: bool,
}

/// Load the configured instruments from `source`.
pub fn load_universe(
    config: &AnalysisConfig,
    source: &DataSource,
) -> Result<LoadedUniverse, AnalysisError> {
    config.validate()?;
    let (universe, synthetic) = match source {
        DataSource::Csv(path) => (
            load_csv_universe(path, &config.instruments, &config.reference)?,
            false,
        ),
        DataSource::Synthetic { start, end } => {
            log::warn!("using synthetic data for {} instruments", config.instruments.len());
            let universe =
                synthetic_universe(&config.instruments, &config.reference, *start, *end)
                    .ok_or_else(|| DataError::ReferenceNotInUniverse(config.reference.clone()))?;
            (universe, true)
        }
    };
    let dataset_hash = DatasetHash::of(&universe);
    log::info!("dataset {}", dataset_hash.short());
    Ok(LoadedUniverse {
        universe,
        dataset_hash,
        synthetic,
    })
}

/// Date coverage of the loaded universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    /// Dates on which every instrument has a value.
    pub common_dates: usize,
    pub first_common: Option<NaiveDate>,
    pub last_common: Option<NaiveDate>,
    pub total_points: usize,
}

/// Output of a complete run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub schema_version: u32,
    pub config: AnalysisConfig,
    pub dataset_hash: DatasetHash,
    pub synthetic: bool,
    pub coverage: Coverage,
    pub price: WorkflowReport,
    pub returns: WorkflowReport,
}

impl AnalysisReport {
    /// Total skip notices across both workflows.
    pub fn skip_count(&self) -> usize {
        self.price.skipped.len() + self.returns.skipped.len()
    }
}

/// Run the price workflow, then the return workflow.
pub fn run_analysis(
    data: &LoadedUniverse,
    config: &AnalysisConfig,
    factory: &dyn ForecasterFactory,
    sink: &mut dyn ChartSink,
) -> Result<AnalysisReport, AnalysisError> {
    config.validate()?;
    let universe = &data.universe;

    let common = common_dates(universe.iter().map(|(_, s)| s));
    if common.is_empty() {
        log::warn!("instruments share no dates; cross-correlations will be skipped");
    }
    let coverage = Coverage {
        common_dates: common.len(),
        first_common: common.first().copied(),
        last_common: common.last().copied(),
        total_points: universe.point_count(),
    };

    let price = run_workflow(universe, config, &PriceLevel, factory, &mut *sink)?;
    let returns = run_workflow(universe, config, &ReturnLevel, factory, &mut *sink)?;

    Ok(AnalysisReport {
        schema_version: SCHEMA_VERSION,
        config: config.clone(),
        dataset_hash: data.dataset_hash.clone(),
        synthetic: data.synthetic,
        coverage,
        price,
        returns,
    })
}

//! CorrLab Runner — configuration, analysis orchestration, chart sinks, export.
//!
//! This crate builds on `corrlab-core` to provide:
//! - TOML analysis configuration
//! - The generic workflow, run once on price levels and once on returns
//! - Chart sinks (per-chart CSV artifacts, or nothing)
//! - Report export: JSON manifest, forecast CSV, Markdown summary

pub mod analysis;
pub mod chart;
pub mod config;
pub mod export;
pub mod workflow;

pub use analysis::{
    load_universe, run_analysis, AnalysisError, AnalysisReport, Coverage, DataSource,
    LoadedUniverse, SCHEMA_VERSION,
};
pub use chart::{ArtifactSink, ChartSink, NullSink, SinkError};
pub use config::{AnalysisConfig, ConfigError, ForecastConfig};
pub use workflow::{
    build_pairs, run_workflow, CrossCorrelationSummary, InstrumentForecast, InstrumentSummary,
    PairTransform, PriceLevel, ReturnLevel, SkipNotice, SkipReason, Stage, WorkflowError,
    WorkflowReport,
};

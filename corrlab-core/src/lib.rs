//! CorrLab Core — series types, smoothing, correlation estimators, forecasting.
//!
//! This crate contains the signal-processing half of the analysis:
//! - Domain types (time series, original/filtered pairs, instrument universe)
//! - Pairwise date alignment and the CSV / synthetic data sources
//! - Moving-average smoothing and percentage-return transforms
//! - Autocorrelation and cross-correlation estimators
//! - One-step forecast adapter over a pluggable additive seasonal model
//! - Dataset fingerprinting

pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod forecast;
pub mod stats;
pub mod transforms;

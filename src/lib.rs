//! # brpl-metrics - Metrics extraction for trust-aware BRPL simulations
//!
//! This library turns the artifacts of Cooja simulation batches into
//! tabular performance summaries.
//!
//! ## Overview
//!
//! Every simulation run leaves a directory holding the Cooja log and, when
//! the trust engine was enabled, a few CSV side files. The library extracts
//! from them:
//!
//! - **Delivery**: distinct transmissions and receptions, packet delivery ratio
//! - **Delay**: one-way delay samples, directly or as half the round trip
//! - **Overhead**: routing control lines relative to data transmissions
//! - **Exposure**: trust-engine e1/e3 figures and their numerators/denominators
//! - **Stability**: parent-switch rate and sink advantage/stability
//!
//! ## Architecture
//!
//! - `analysis::log_parser`: line classification and per-log accumulation
//! - `analysis::exposure`, `analysis::stability`: side-file schema strategies
//! - `analysis::run_name`: experiment parameters from run directory names
//! - `analysis::summary`: per-run records, validity checks, batch collection
//! - `analysis::report`, `analysis::scenario`: CSV tables and text/JSON reports
//! - `layout`: where each artifact lives inside a run directory
//! - `error`: typed errors for missing or unreadable inputs
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use brpl_metrics::analysis;
//! use brpl_metrics::layout::RunLayout;
//! use std::path::Path;
//!
//! let results = Path::new("results/experiments-2024");
//! let tables = analysis::collect_runs(results, &RunLayout::default())?;
//! let summary = analysis::write_summary_tables(
//!     &tables,
//!     results,
//!     analysis::report::DEFAULT_SUMMARY_NAME,
//!     analysis::report::DEFAULT_INVALID_NAME,
//! )?;
//! println!("{}", summary.display());
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Malformed lines and unreadable optional files never abort a batch; they
//! only blank the affected metrics. Orchestration functions return
//! `color_eyre::Result` with the offending path in the error context.

pub mod analysis;
pub mod error;
pub mod layout;

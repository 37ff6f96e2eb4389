//! Metrics extraction and aggregation for BRPL simulation runs.
//!
//! This module turns Cooja logs and trust-engine side files into delivery,
//! delay, overhead and exposure metrics, and aggregates them per run.

pub mod types;
pub mod csv_table;
pub mod log_parser;
pub mod exposure;
pub mod stability;
pub mod run_name;
pub mod summary;
pub mod scenario;
pub mod report;

pub use types::*;
pub use log_parser::{parse_log_file, parse_log_reader};
pub use exposure::load_exposure;
pub use stability::load_stability;
pub use summary::{collect_runs, summarize_run, RunOutcome, RunSummary, SummaryTables};
pub use scenario::{write_comparison, ScenarioMetrics};
pub use report::{generate_json_report, generate_text_report, write_summary_tables, LogReport};

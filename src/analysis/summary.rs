//! Per-run summaries over a results directory.
//!
//! Each run directory contributes at most one record, to either the valid or
//! the invalid table. Runs without a log are skipped entirely.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};

use super::exposure::load_exposure;
use super::log_parser::parse_log_file;
use super::stability::load_stability;
use super::types::*;
use crate::layout::RunLayout;

/// Column order of the valid-runs table
pub const SUMMARY_COLUMNS: [&str; 26] = [
    "run",
    "topology",
    "attack_rate",
    "trust",
    "lambda",
    "gamma",
    "attack_mode",
    "sink_delta",
    "trust_alpha",
    "seed",
    "pdr",
    "avg_delay_ms",
    "tx",
    "rx",
    "lost",
    "e1",
    "e1_num",
    "e1_den",
    "e3",
    "e3_num",
    "e3_den",
    "parent_switch_rate",
    "sink_adv_attacker",
    "sink_stab_attacker",
    "sink_adv_mean",
    "sink_stab_mean",
];

/// Column order of the invalid-runs table
pub const INVALID_COLUMNS: [&str; 20] = [
    "run",
    "topology",
    "attack_rate",
    "trust",
    "lambda",
    "gamma",
    "attack_mode",
    "sink_delta",
    "trust_alpha",
    "seed",
    "tx",
    "rx",
    "lost",
    "e1",
    "e1_num",
    "e1_den",
    "e3",
    "e3_num",
    "e3_den",
    "invalid_reason",
];

/// Everything known about one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run: String,
    pub params: RunParams,
    pub tx: usize,
    pub rx: usize,
    pub pdr: f64,
    pub avg_delay_ms: Option<f64>,
    pub exposure: ExposureMetrics,
    pub stability: StabilityMetrics,
}

fn fixed(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(String::new, |v| format!("{:.*}", decimals, v))
}

fn count<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(String::new, |v| v.to_string())
}

impl RunSummary {
    pub fn new(
        run: &str,
        metrics: &LogMetrics,
        exposure: ExposureMetrics,
        stability: StabilityMetrics,
    ) -> Self {
        Self {
            run: run.to_string(),
            params: RunParams::from_run_name(run),
            tx: metrics.tx_count(),
            rx: metrics.rx_count(),
            pdr: metrics.pdr(),
            avg_delay_ms: metrics.avg_delay_ms(),
            exposure,
            stability,
        }
    }

    /// Transmissions minus receptions. Negative values signal a corrupt log.
    pub fn lost(&self) -> i64 {
        self.tx as i64 - self.rx as i64
    }

    /// Consistency checks, in reporting order. Empty means valid.
    pub fn invalid_reasons(&self) -> Vec<InvalidReason> {
        let checks = [
            (self.tx == 0, InvalidReason::NoTransmissions),
            (self.rx == 0, InvalidReason::NoReceptions),
            (self.tx < self.rx, InvalidReason::MoreReceptionsThanTransmissions),
            (self.exposure.e1_den == Some(0.0), InvalidReason::ZeroE1Denominator),
            (self.exposure.e3_den == Some(0.0), InvalidReason::ZeroE3Denominator),
        ];
        checks
            .into_iter()
            .filter_map(|(failed, reason)| failed.then_some(reason))
            .collect()
    }

    /// Rendered value of a named output column; unknown columns are blank
    pub fn field(&self, column: &str) -> String {
        let p = &self.params;
        let e = &self.exposure;
        let s = &self.stability;
        match column {
            "run" => self.run.clone(),
            "topology" => p.topology.clone(),
            "attack_rate" => count(p.attack_rate),
            "trust" => p.trust.to_string(),
            "lambda" => p.lambda.to_string(),
            "gamma" => p.gamma.to_string(),
            "attack_mode" => count(p.attack_mode),
            "sink_delta" => count(p.sink_delta),
            "trust_alpha" => p.trust_alpha.map_or_else(String::new, |a| format!("{:?}", a)),
            "seed" => count(p.seed),
            "pdr" => format!("{:.2}", self.pdr),
            "avg_delay_ms" => fixed(self.avg_delay_ms, 2),
            "tx" => self.tx.to_string(),
            "rx" => self.rx.to_string(),
            "lost" => self.lost().to_string(),
            "e1" => fixed(e.e1, 2),
            "e3" => fixed(e.e3, 2),
            "e1_num" => fixed(e.e1_num, 0),
            "e1_den" => fixed(e.e1_den, 0),
            "e3_num" => fixed(e.e3_num, 0),
            "e3_den" => fixed(e.e3_den, 0),
            "parent_switch_rate" => fixed(s.parent_switch_rate, 4),
            "sink_adv_attacker" => fixed(s.sink_adv_attacker, 4),
            "sink_stab_attacker" => fixed(s.sink_stab_attacker, 4),
            "sink_adv_mean" => fixed(s.sink_adv_mean, 4),
            "sink_stab_mean" => fixed(s.sink_stab_mean, 4),
            _ => String::new(),
        }
    }

    pub fn row(&self, columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| self.field(c)).collect()
    }
}

/// A run routed to the invalid table
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidRun {
    pub summary: RunSummary,
    pub reasons: Vec<InvalidReason>,
}

impl InvalidRun {
    /// Reasons joined with `;`
    pub fn reason(&self) -> String {
        self.reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn row(&self, columns: &[&str]) -> Vec<String> {
        columns
            .iter()
            .map(|&c| match c {
                "invalid_reason" => self.reason(),
                _ => self.summary.field(c),
            })
            .collect()
    }
}

/// Classification of a processed run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Valid(RunSummary),
    Invalid(InvalidRun),
}

impl RunOutcome {
    pub fn classify(summary: RunSummary) -> Self {
        let reasons = summary.invalid_reasons();
        if reasons.is_empty() {
            RunOutcome::Valid(summary)
        } else {
            RunOutcome::Invalid(InvalidRun { summary, reasons })
        }
    }
}

/// Both output tables, sorted by run name once complete
#[derive(Debug, Clone, Default)]
pub struct SummaryTables {
    pub valid: Vec<RunSummary>,
    pub invalid: Vec<InvalidRun>,
}

impl SummaryTables {
    pub fn push(&mut self, outcome: RunOutcome) {
        match outcome {
            RunOutcome::Valid(summary) => self.valid.push(summary),
            RunOutcome::Invalid(invalid) => self.invalid.push(invalid),
        }
    }

    pub fn sort(&mut self) {
        self.valid.sort_by(|a, b| a.run.cmp(&b.run));
        self.invalid.sort_by(|a, b| a.summary.run.cmp(&b.summary.run));
    }

    pub fn len(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Extract and classify one run. Returns `None` when the run has no log.
pub fn summarize_run(run_dir: &Path, layout: &RunLayout) -> Result<Option<RunOutcome>> {
    let run = run_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let log_path = layout.log_path(run_dir);
    if !log_path.is_file() {
        log::debug!("Skipping {}: no log at {}", run, log_path.display());
        return Ok(None);
    }

    let metrics = parse_log_file(&log_path)
        .with_context(|| format!("Failed to extract metrics for run {}", run))?;
    let exposure = load_exposure(&layout.exposure_path(run_dir));
    let stability = load_stability(
        &layout.parent_switch_path(run_dir),
        &layout.stats_path(run_dir),
    );

    let outcome = RunOutcome::classify(RunSummary::new(&run, &metrics, exposure, stability));
    if let RunOutcome::Invalid(ref invalid) = outcome {
        log::warn!("Run {} is invalid: {}", run, invalid.reason());
    }
    Ok(Some(outcome))
}

/// Process every run directory directly under `results_dir`
pub fn collect_runs(results_dir: &Path, layout: &RunLayout) -> Result<SummaryTables> {
    log::info!("Scanning runs in {}", results_dir.display());

    let entries = fs::read_dir(results_dir)
        .with_context(|| format!("Failed to read results directory: {}", results_dir.display()))?;

    let mut tables = SummaryTables::default();
    let mut skipped = 0;

    for entry in entries {
        let run_dir = match entry {
            Ok(e) => e.path(),
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {}", results_dir.display(), e);
                continue;
            }
        };
        if !run_dir.is_dir() {
            continue;
        }

        match summarize_run(&run_dir, layout) {
            Ok(Some(outcome)) => tables.push(outcome),
            Ok(None) => skipped += 1,
            Err(e) => {
                log::warn!("Skipping {}: {:#}", run_dir.display(), e);
                skipped += 1;
            }
        }
    }

    tables.sort();
    log::info!(
        "Summarized {} runs ({} valid, {} invalid, {} skipped)",
        tables.len(),
        tables.valid.len(),
        tables.invalid.len(),
        skipped
    );
    Ok(tables)
}

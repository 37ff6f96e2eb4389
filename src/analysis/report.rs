//! Report generation.
//!
//! Writes the per-run summary tables and renders single-log reports as
//! human-readable text or JSON.

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use serde::Serialize;

use super::csv_table::CsvWriter;
use super::summary::{SummaryTables, INVALID_COLUMNS, SUMMARY_COLUMNS};
use super::types::*;

/// Default file name of the valid-runs table
pub const DEFAULT_SUMMARY_NAME: &str = "summary_from_trust_engine.csv";

/// File name of the invalid-runs table
pub const DEFAULT_INVALID_NAME: &str = "invalid_runs.csv";

pub fn summary_table(tables: &SummaryTables) -> CsvWriter {
    let mut writer = CsvWriter::new(&SUMMARY_COLUMNS);
    for summary in &tables.valid {
        writer.push_row(summary.row(&SUMMARY_COLUMNS));
    }
    writer
}

pub fn invalid_table(tables: &SummaryTables) -> CsvWriter {
    let mut writer = CsvWriter::new(&INVALID_COLUMNS);
    for invalid in &tables.invalid {
        writer.push_row(invalid.row(&INVALID_COLUMNS));
    }
    writer
}

/// Write both tables into `results_dir`.
///
/// The invalid table is only written when at least one run is invalid.
/// Returns the path of the summary table.
pub fn write_summary_tables(
    tables: &SummaryTables,
    results_dir: &Path,
    summary_name: &str,
    invalid_name: &str,
) -> Result<PathBuf> {
    let summary_path = results_dir.join(summary_name);
    summary_table(tables)
        .write(&summary_path)
        .context("Failed to write summary table")?;
    log::info!(
        "Summary of {} valid runs written to {}",
        tables.valid.len(),
        summary_path.display()
    );

    if !tables.invalid.is_empty() {
        let invalid_path = results_dir.join(invalid_name);
        invalid_table(tables)
            .write(&invalid_path)
            .context("Failed to write invalid-runs table")?;
        log::info!(
            "{} invalid runs written to {}",
            tables.invalid.len(),
            invalid_path.display()
        );
    }

    Ok(summary_path)
}

/// Metadata attached to a single-log report
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub analysis_timestamp: String,
    pub log_file: String,
}

/// Metrics of one log, ready to print or serialize
#[derive(Debug, Clone, Serialize)]
pub struct LogReport {
    pub metadata: ReportMetadata,
    pub tx: usize,
    pub rx: usize,
    /// Overall delivery ratio in percent, absent without transmissions
    pub pdr: Option<f64>,
    pub nodes: Vec<NodeDelivery>,
    pub delay: Option<DelayStats>,
    pub control_packets: u64,
    pub overhead_pct: Option<f64>,
}

impl LogReport {
    pub fn new(log_file: &Path, metrics: &LogMetrics) -> Self {
        let tx = metrics.tx_count();
        Self {
            metadata: ReportMetadata {
                analysis_timestamp: chrono::Utc::now().to_rfc3339(),
                log_file: log_file.display().to_string(),
            },
            tx,
            rx: metrics.rx_count(),
            pdr: (tx > 0).then(|| metrics.pdr()),
            nodes: metrics.node_breakdown(),
            delay: metrics.delay_stats(),
            control_packets: metrics.control_packets,
            overhead_pct: metrics.overhead_pct(),
        }
    }
}

/// Render a single-log report as text
pub fn generate_text_report(report: &LogReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("=".repeat(60));
    lines.push("Performance Analysis Results".to_string());
    lines.push("=".repeat(60));

    // PDR
    lines.push(String::new());
    lines.push("[1] PDR (Packet Delivery Ratio)".to_string());
    lines.push("-".repeat(60));
    for node in &report.nodes {
        let id = node.node.to_string();
        match node.pdr() {
            Some(pdr) => lines.push(format!(
                "Node {:>2}: TX={:4}, RX={:4}, PDR={:6.2}%",
                id, node.tx, node.rx, pdr
            )),
            None => lines.push(format!("Node {:>2}: No TX packets", id)),
        }
    }
    lines.push(String::new());
    match report.pdr {
        Some(pdr) => lines.push(format!(
            "Overall: TX={:4}, RX={:4}, PDR={:6.2}%",
            report.tx, report.rx, pdr
        )),
        None => lines.push("No TX packets detected".to_string()),
    }

    // Delay
    lines.push(String::new());
    lines.push("[2] End-to-End Delay".to_string());
    lines.push("-".repeat(60));
    match report.delay {
        Some(delay) => {
            lines.push(format!("Sample count: {}", delay.samples));
            lines.push(format!("Average:      {:.2} ms", delay.mean_ms));
            lines.push(format!("Min:          {:.2} ms", delay.min_ms));
            lines.push(format!("Max:          {:.2} ms", delay.max_ms));
        }
        None => lines.push("No delay data available".to_string()),
    }

    // Overhead
    lines.push(String::new());
    lines.push("[3] Overhead (Control Packets)".to_string());
    lines.push("-".repeat(60));
    lines.push(format!("RPL packets:  {}", report.control_packets));
    if let Some(overhead) = report.overhead_pct {
        lines.push(format!("Control/Data: {:.2}%", overhead));
    }

    lines.push(String::new());
    lines.push("=".repeat(60));
    lines.join("\n")
}

/// Generate JSON report
pub fn generate_json_report(report: &LogReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::summary::{RunOutcome, RunSummary};

    fn outcome(run: &str, tx: &[u32], rx: &[u32]) -> RunOutcome {
        let mut m = LogMetrics::default();
        for &seq in tx {
            m.record_tx(NodeRef::Id(1), seq);
        }
        for &seq in rx {
            m.record_rx(NodeRef::Id(1), seq);
        }
        RunOutcome::classify(RunSummary::new(
            run,
            &m,
            ExposureMetrics::default(),
            StabilityMetrics::default(),
        ))
    }

    #[test]
    fn test_summary_table_layout() {
        let mut tables = SummaryTables::default();
        tables.push(outcome("grid_atk10_trust1_s1", &[1, 2], &[1]));
        let csv = summary_table(&tables).to_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(SUMMARY_COLUMNS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("grid_atk10_trust1_s1,grid,10,1,0,1,,,,1,50.00,,2,1,1,,,,,,,,,,,")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_invalid_table_written_only_when_needed() {
        let dir = tempfile::tempdir().unwrap();

        let mut tables = SummaryTables::default();
        tables.push(outcome("ok_s1", &[1], &[1]));
        let path =
            write_summary_tables(&tables, dir.path(), "out.csv", DEFAULT_INVALID_NAME).unwrap();
        assert_eq!(path, dir.path().join("out.csv"));
        assert!(path.exists());
        assert!(!dir.path().join(DEFAULT_INVALID_NAME).exists());

        tables.push(outcome("bad_s2", &[], &[]));
        write_summary_tables(&tables, dir.path(), "out.csv", DEFAULT_INVALID_NAME).unwrap();
        let invalid = fs::read_to_string(dir.path().join(DEFAULT_INVALID_NAME)).unwrap();
        assert!(invalid.ends_with("bad_s2,bad,,0,0,1,,,,2,0,0,0,,,,,,,tx=0;rx=0\n"));
    }

    #[test]
    fn test_text_report_sections() {
        let mut m = LogMetrics::default();
        m.record_tx(NodeRef::Id(2), 1);
        m.record_tx(NodeRef::Id(2), 2);
        m.record_rx(NodeRef::Id(2), 1);
        m.delays_ms = vec![4.0, 6.0];
        m.control_packets = 3;

        let report = LogReport::new(Path::new("COOJA.testlog"), &m);
        let text = generate_text_report(&report);
        assert!(text.contains("Node  2: TX=   2, RX=   1, PDR= 50.00%"));
        assert!(text.contains("Overall: TX=   2, RX=   1, PDR= 50.00%"));
        assert!(text.contains("Average:      5.00 ms"));
        assert!(text.contains("Control/Data: 150.00%"));
    }

    #[test]
    fn test_text_report_without_traffic() {
        let report = LogReport::new(Path::new("empty.log"), &LogMetrics::default());
        let text = generate_text_report(&report);
        assert!(text.contains("No TX packets detected"));
        assert!(text.contains("No delay data available"));
        assert!(!text.contains("Control/Data"));
    }

    #[test]
    fn test_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut m = LogMetrics::default();
        m.record_tx(NodeRef::Id(1), 1);

        generate_json_report(&LogReport::new(Path::new("a.log"), &m), &path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["tx"], 1);
        assert_eq!(value["pdr"], 0.0);
        assert_eq!(value["metadata"]["log_file"], "a.log");
        assert!(value["delay"].is_null());
    }
}

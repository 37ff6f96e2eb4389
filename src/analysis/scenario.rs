//! Side-by-side comparison of a baseline and an attack scenario.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use serde::Serialize;

use super::csv_table::CsvWriter;
use super::types::LogMetrics;

/// File written into the comparison output directory
pub const COMPARISON_FILE: &str = "phase3_summary.csv";

pub const COMPARISON_COLUMNS: [&str; 8] = [
    "scenario",
    "tx",
    "rx",
    "pdr",
    "avg_delay_ms",
    "rpl_packets",
    "control_data_pct",
    "delay_samples",
];

/// Headline numbers for one scenario; ratios fall back to 0
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioMetrics {
    pub tx: usize,
    pub rx: usize,
    pub pdr: f64,
    pub avg_delay_ms: f64,
    pub control_packets: u64,
    pub overhead_pct: f64,
    pub delay_samples: usize,
}

impl From<&LogMetrics> for ScenarioMetrics {
    fn from(metrics: &LogMetrics) -> Self {
        Self {
            tx: metrics.tx_count(),
            rx: metrics.rx_count(),
            pdr: metrics.pdr(),
            avg_delay_ms: metrics.avg_delay_ms().unwrap_or(0.0),
            control_packets: metrics.control_packets,
            overhead_pct: metrics.overhead_pct().unwrap_or(0.0),
            delay_samples: metrics.delays_ms.len(),
        }
    }
}

impl ScenarioMetrics {
    fn row(&self, label: &str) -> Vec<String> {
        vec![
            label.to_string(),
            self.tx.to_string(),
            self.rx.to_string(),
            format!("{:.2}", self.pdr),
            format!("{:.2}", self.avg_delay_ms),
            self.control_packets.to_string(),
            format!("{:.2}", self.overhead_pct),
            self.delay_samples.to_string(),
        ]
    }

    /// One-line console summary
    pub fn summary_line(&self, label: &str) -> String {
        format!(
            "{}: TX={}, RX={}, PDR={:.2}%, AvgDelay={:.2}ms, Overhead={:.2}%",
            label, self.tx, self.rx, self.pdr, self.avg_delay_ms, self.overhead_pct
        )
    }
}

pub fn comparison_table(normal: &ScenarioMetrics, attack: &ScenarioMetrics) -> CsvWriter {
    let mut writer = CsvWriter::new(&COMPARISON_COLUMNS);
    writer.push_row(normal.row("normal"));
    writer.push_row(attack.row("attack"));
    writer
}

/// Write the comparison table into `output_dir` and return its path
pub fn write_comparison(
    output_dir: &Path,
    normal: &ScenarioMetrics,
    attack: &ScenarioMetrics,
) -> Result<PathBuf> {
    let path = output_dir.join(COMPARISON_FILE);
    comparison_table(normal, attack)
        .write(&path)
        .context("Failed to write scenario comparison")?;
    log::info!("Scenario comparison written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::log_parser::parse_log_reader;

    #[test]
    fn test_comparison_rows() {
        let normal = ScenarioMetrics::from(&parse_log_reader(
            "CSV,TX,2,1,0,1\nCSV,TX,2,2,0,1\nCSV,RX,fd00::2,1,5,8\nCSV,RTT,1,0,30,30,8\nRPL: DIO\n"
                .as_bytes(),
        ));
        let attack = ScenarioMetrics::from(&parse_log_reader("RPL: DAO\n".as_bytes()));

        assert_eq!(
            normal.summary_line("Normal"),
            "Normal: TX=2, RX=1, PDR=50.00%, AvgDelay=15.00ms, Overhead=50.00%"
        );

        let csv = comparison_table(&normal, &attack).to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], COMPARISON_COLUMNS.join(","));
        assert_eq!(lines[1], "normal,2,1,50.00,15.00,1,50.00,1");
        assert_eq!(lines[2], "attack,0,0,0.00,0.00,1,0.00,0");
    }

    #[test]
    fn test_write_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let empty = ScenarioMetrics::from(&LogMetrics::default());
        let path = write_comparison(dir.path(), &empty, &empty).unwrap();
        assert_eq!(path, dir.path().join(COMPARISON_FILE));
        assert_eq!(std::fs::read_to_string(path).unwrap().lines().count(), 3);
    }
}

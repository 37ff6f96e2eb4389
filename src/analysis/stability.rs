//! Routing stability metrics: parent-switch rate and sink advantage/stability.

use std::path::Path;

use super::csv_table::{parse_number, CsvTable};
use super::types::StabilityMetrics;

/// Mean of every parseable `switch_rate` in a dedicated parent-switch file
pub fn mean_switch_rate(table: &CsvTable) -> Option<f64> {
    let rates: Vec<f64> = table
        .records()
        .iter()
        .filter_map(|record| parse_number(table.value(record, "switch_rate")))
        .collect();

    if rates.is_empty() {
        None
    } else {
        Some(rates.iter().sum::<f64>() / rates.len() as f64)
    }
}

/// `parent_switch_rate` from the last row of a general stats file
pub fn last_switch_rate(table: &CsvTable) -> Option<f64> {
    let last = table.last_record()?;
    parse_number(table.value(last, "parent_switch_rate"))
}

fn read_optional(path: &Path) -> Option<CsvTable> {
    if !path.is_file() {
        log::debug!("No stability file at {}", path.display());
        return None;
    }
    CsvTable::read(path)
        .map_err(|e| log::warn!("Ignoring stability file: {}", e))
        .ok()
}

/// Combine the parent-switch file and the stats file.
///
/// The switch rate comes from the dedicated file when it yields a value.
/// Otherwise the stats file supplies the rate together with the sink
/// figures; sink figures stay blank while the dedicated file is in use.
pub fn stability_from_tables(
    parent_switch: Option<&CsvTable>,
    stats: Option<&CsvTable>,
) -> StabilityMetrics {
    if let Some(rate) = parent_switch.and_then(mean_switch_rate) {
        return StabilityMetrics {
            parent_switch_rate: Some(rate),
            ..StabilityMetrics::default()
        };
    }

    let Some(stats) = stats else {
        return StabilityMetrics::default();
    };
    let sink = |name: &str| parse_number(stats.value(stats.last_record()?, name));

    StabilityMetrics {
        parent_switch_rate: last_switch_rate(stats),
        sink_adv_attacker: sink("sink_adv_attacker"),
        sink_stab_attacker: sink("sink_stab_attacker"),
        sink_adv_mean: sink("sink_adv_mean"),
        sink_stab_mean: sink("sink_stab_mean"),
    }
}

/// Load stability metrics; missing or unreadable files yield blanks
pub fn load_stability(parent_switch_path: &Path, stats_path: &Path) -> StabilityMetrics {
    let parent_switch = read_optional(parent_switch_path);
    let stats = read_optional(stats_path);
    stability_from_tables(parent_switch.as_ref(), stats.as_ref())
}

//! Exposure metrics from the trust engine's `exposure.csv`.
//!
//! Two schemas are in circulation: a header-keyed one (`e1`, `e3`,
//! `e1_num`, ...) and an older positional one. They are tried in order and
//! the first that recognizes the file wins.

use std::path::Path;

use super::csv_table::{is_comment, parse_number, CsvTable};
use super::types::ExposureMetrics;

type ExposureStrategy = fn(&CsvTable) -> Option<ExposureMetrics>;

const STRATEGIES: [(&str, ExposureStrategy); 2] = [
    ("header", from_named_columns),
    ("positional", from_positional_columns),
];

/// Positional layout: `time,e1_den,e1_num,_,e3_den,e1,e3,...`
const POS_E1_DEN: usize = 1;
const POS_E1_NUM: usize = 2;
const POS_E3_DEN: usize = 4;
const POS_E1: usize = 5;
const POS_E3: usize = 6;
const POSITIONAL_MIN_FIELDS: usize = 7;

/// Header-keyed schema; fields are read independently from the last record
fn from_named_columns(table: &CsvTable) -> Option<ExposureMetrics> {
    if table.header().is_some_and(is_comment) {
        return None;
    }
    if !table.has_column("e1") && !table.has_column("e3") {
        return None;
    }
    let last = table.records().iter().rev().find(|row| !is_comment(row))?;
    let field = |name: &str| parse_number(table.value(last, name));

    Some(ExposureMetrics {
        e1: field("e1"),
        e3: field("e3"),
        e1_num: field("e1_num"),
        e1_den: field("e1_den"),
        e3_num: field("e3_num"),
        e3_den: field("e3_den"),
    })
}

/// Positional schema; fields are read in a fixed order and reading stops at
/// the first one that fails to parse, keeping the ones before it
fn from_positional_columns(table: &CsvTable) -> Option<ExposureMetrics> {
    let last = table
        .rows()
        .iter()
        .rev()
        .find(|row| !is_comment(row))?;
    if last.len() < POSITIONAL_MIN_FIELDS {
        return None;
    }
    let field = |index: usize| parse_number(last.get(index).map(String::as_str));

    let mut metrics = ExposureMetrics::default();
    let slots = [
        (POS_E1, &mut metrics.e1),
        (POS_E3, &mut metrics.e3),
        (POS_E1_NUM, &mut metrics.e1_num),
        (POS_E1_DEN, &mut metrics.e1_den),
        (POS_E3_DEN, &mut metrics.e3_den),
    ];
    let complete = slots.into_iter().all(|(index, slot)| {
        *slot = field(index);
        slot.is_some()
    });

    // e3 is a percentage of e3_den
    if complete {
        if let (Some(e3), Some(e3_den)) = (metrics.e3, metrics.e3_den) {
            metrics.e3_num = (e3_den != 0.0).then(|| e3 * e3_den / 100.0);
        }
    }
    Some(metrics)
}

/// Run the schema strategies in order
pub fn exposure_from_table(table: &CsvTable) -> ExposureMetrics {
    STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            let metrics = strategy(table)?;
            log::trace!("Exposure schema recognized as {}", name);
            Some(metrics)
        })
        .unwrap_or_default()
}

/// Load exposure metrics; a missing or unreadable file yields blanks
pub fn load_exposure(path: &Path) -> ExposureMetrics {
    if !path.is_file() {
        log::debug!("No exposure file at {}", path.display());
        return ExposureMetrics::default();
    }
    match CsvTable::read(path) {
        Ok(table) => exposure_from_table(&table),
        Err(e) => {
            log::warn!("Ignoring exposure file: {}", e);
            ExposureMetrics::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> CsvTable {
        CsvTable::from_reader(text.as_bytes())
    }

    #[test]
    fn test_header_schema_uses_last_row() {
        let metrics = exposure_from_table(&table(
            "time,e1,e1_num,e1_den,e3,e3_num,e3_den\n\
             10,50.0,1,2,25.0,1,4\n\
             20,40.0,2,5,20.0,1,5\n",
        ));
        assert_eq!(metrics.e1, Some(40.0));
        assert_eq!(metrics.e1_num, Some(2.0));
        assert_eq!(metrics.e1_den, Some(5.0));
        assert_eq!(metrics.e3, Some(20.0));
        assert_eq!(metrics.e3_den, Some(5.0));
    }

    #[test]
    fn test_header_schema_partial_fields() {
        let metrics = exposure_from_table(&table("e1,e3,e1_den\n12.5,,x\n"));
        assert_eq!(metrics.e1, Some(12.5));
        assert_eq!(metrics.e3, None);
        assert_eq!(metrics.e1_den, None);
        assert_eq!(metrics.e3_num, None);
    }

    #[test]
    fn test_positional_schema() {
        let metrics = exposure_from_table(&table(
            "# time,e1_den,e1_num,x,e3_den,e1,e3\n\
             100,4,1,0,8,25.0,50.0\n\
             # trailing comment\n",
        ));
        assert_eq!(metrics.e1, Some(25.0));
        assert_eq!(metrics.e3, Some(50.0));
        assert_eq!(metrics.e1_num, Some(1.0));
        assert_eq!(metrics.e1_den, Some(4.0));
        assert_eq!(metrics.e3_den, Some(8.0));
        assert_eq!(metrics.e3_num, Some(4.0));
    }

    #[test]
    fn test_positional_zero_denominator() {
        let metrics = exposure_from_table(&table("100,0,0,0,0,0.0,0.0\n"));
        assert_eq!(metrics.e1_den, Some(0.0));
        assert_eq!(metrics.e3_den, Some(0.0));
        assert_eq!(metrics.e3_num, None);
    }

    #[test]
    fn test_positional_keeps_fields_before_bad_value() {
        let metrics = exposure_from_table(&table("100,n/a,1,0,8,25.0,50.0\n"));
        assert_eq!(metrics.e1, Some(25.0));
        assert_eq!(metrics.e3, Some(50.0));
        assert_eq!(metrics.e1_num, Some(1.0));
        assert_eq!(metrics.e1_den, None);
        assert_eq!(metrics.e3_den, None);
        assert_eq!(metrics.e3_num, None);
    }

    #[test]
    fn test_unrecognized_file_is_blank() {
        assert_eq!(exposure_from_table(&table("a,b\n1,2\n")), ExposureMetrics::default());
        assert_eq!(exposure_from_table(&table("")), ExposureMetrics::default());
    }

    #[test]
    fn test_missing_file_is_blank() {
        let metrics = load_exposure(Path::new("/nonexistent/exposure.csv"));
        assert_eq!(metrics, ExposureMetrics::default());
    }
}

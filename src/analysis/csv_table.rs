//! Minimal CSV reading and writing for trust-engine side files and summaries.
//!
//! Side files come in two shapes: a header row followed by records, or bare
//! positional rows. [`CsvTable`] keeps every non-blank row so callers can
//! interpret it either way.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::AnalysisError;

/// Parsed rows of a CSV file, blank lines removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn read(path: &Path) -> Result<Self, AnalysisError> {
        if !path.is_file() {
            return Err(AnalysisError::missing(path));
        }
        let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
        Ok(Self::from_reader(BufReader::new(file)))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Self {
        let rows = reader
            .split(b'\n')
            .map_while(Result::ok)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .filter(|line| !line.trim().is_empty())
            .map(|line| split_record(&line))
            .collect();
        Self { rows }
    }

    /// Every row, header included
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Rows after the header
    pub fn records(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header()?.iter().position(|h| h.trim() == name)
    }

    /// Field of `record` under header column `name`
    pub fn value<'a>(&self, record: &'a [String], name: &str) -> Option<&'a str> {
        let index = self.column_index(name)?;
        record.get(index).map(|v| v.trim())
    }

    pub fn last_record(&self) -> Option<&[String]> {
        self.records().last().map(Vec::as_slice)
    }
}

/// Whether a row is a `#` comment
pub fn is_comment(row: &[String]) -> bool {
    row.first().is_some_and(|f| f.trim_start().starts_with('#'))
}

/// Parse a field as a float, treating blanks and garbage as absent
pub fn parse_number(field: Option<&str>) -> Option<f64> {
    field?.trim().parse().ok()
}

/// Split one CSV line into fields, honouring double-quoted fields
pub fn split_record(line: &str) -> Vec<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Escape CSV field (handle commas, quotes, newlines)
pub fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Table writer with a fixed column order
#[derive(Debug)]
pub struct CsvWriter {
    columns: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl CsvWriter {
    pub fn new(columns: &[&'static str]) -> Self {
        Self {
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    /// Add a row; it must have one value per column
    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.columns.join(","));
        output.push('\n');

        for row in &self.rows {
            let fields: Vec<String> = row.iter().map(|f| escape_field(f)).collect();
            output.push_str(&fields.join(","));
            output.push('\n');
        }

        output
    }

    pub fn write(&self, path: &Path) -> Result<(), AnalysisError> {
        fs::write(path, self.to_csv()).map_err(|e| AnalysisError::io(path, e))
    }
}

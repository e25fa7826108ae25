//! Read node rows from a spreadsheet
//!
//! The first row of the sheet holds the column headers; every following
//! non-blank row becomes one [`NodeRecord`] with its cells in column order.

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::path::Path;

/// One spreadsheet row as ordered `(header, value)` pairs
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// 1-based row number in the sheet
    pub row: usize,
    fields: Vec<(String, Value)>,
}

impl NodeRecord {
    pub fn new(row: usize, fields: Vec<(String, Value)>) -> Self {
        Self { row, fields }
    }

    /// Cell value for a column, if the column exists
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Cell value rendered as text; `None` for missing columns and empty cells
    pub fn text(&self, column: &str) -> Option<String> {
        match self.get(column)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Convert an Excel cell to a JSON value without guessing at types
fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => json!(*i),
        Data::Float(f) => {
            // Excel stores every number as a float
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                json!(*f as i64)
            } else {
                json!(*f)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Value::String(format!("{}", dt)),
        Data::DateTimeIso(s) => Value::String(s.clone()),
        Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(_) => Value::Null,
    }
}

/// Read all node rows from `sheet_name` in the workbook at `path`
pub fn read_node_rows<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<Vec<NodeRecord>> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open spreadsheet: {}", path.display()))?;

    let sheet_names = workbook.sheet_names();
    if !sheet_names.iter().any(|name| name == sheet_name) {
        bail!(
            "Sheet '{}' not found in {} (available: {})",
            sheet_name,
            path.display(),
            sheet_names.join(", ")
        );
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    // Ranges start at the first used cell, not necessarily A1
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        log::warn!("Sheet '{}' is empty", sheet_name);
        return Ok(Vec::new());
    };

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let mut seen = HashSet::new();
    for header in headers.iter().filter(|h| !h.is_empty()) {
        if !seen.insert(header.as_str()) {
            bail!("Duplicate column '{}' in sheet '{}'", header, sheet_name);
        }
    }

    let mut records = Vec::new();

    for (offset, row) in rows.enumerate() {
        // header is row first_row + 1 (1-based), data starts one below it
        let row_number = first_row + offset + 2;

        let fields: Vec<(String, Value)> = headers
            .iter()
            .zip(row.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| (header.clone(), cell_to_value(cell)))
            .collect();

        if fields.iter().all(|(_, value)| value.is_null()) {
            log::debug!("Skipping blank row {}", row_number);
            continue;
        }

        records.push(NodeRecord::new(row_number, fields));
    }

    Ok(records)
}

//! Spreadsheet decoding: first sheet of a workbook to a list of [`Record`]s.
//!
//! The first row of the sheet's used range holds the column headers. Every
//! following row with at least one non-empty cell becomes one record keyed by
//! those headers; empty cells are left out of the record entirely.

use crate::models::{CellValue, Record};
use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Header used for columns whose header cell is empty
pub const EMPTY_HEADER: &str = "__EMPTY";

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to open workbook {path}: {source}")]
    Open {
        path: PathBuf,
        source: calamine::Error,
    },

    #[error("workbook {0} contains no sheets")]
    NoSheets(PathBuf),

    #[error("failed to read sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        source: calamine::Error,
    },
}

/// Records decoded from the first sheet of a workbook
#[derive(Debug)]
pub struct SheetRecords {
    pub sheet_name: String,
    pub records: Vec<Record>,
}

/// Opens the workbook at `path` (format chosen by extension) and converts its
/// first sheet, by position, to records. This is blocking I/O.
pub fn read_first_sheet(path: &Path) -> Result<SheetRecords, SheetError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| SheetError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SheetError::NoSheets(path.to_path_buf()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SheetError::NoSheets(path.to_path_buf()))?
        .map_err(|source| SheetError::Sheet {
            sheet: sheet_name.clone(),
            source,
        })?;

    Ok(SheetRecords {
        records: records_from_range(&range),
        sheet_name,
    })
}

pub fn records_from_range(range: &Range<Data>) -> Vec<Record> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };
    let headers = header_keys(header_row);

    rows.filter_map(|row| {
        let record: Record = row
            .iter()
            .zip(&headers)
            .filter_map(|(cell, header)| cell_value(cell).map(|v| (header.as_str(), v)))
            .collect();
        (!record.is_empty()).then_some(record)
    })
    .collect()
}

/// Derives one unique key per header cell. Empty headers become `__EMPTY` and
/// repeated keys get `_1`, `_2`, ... appended, skipping keys already in use.
pub fn header_keys(row: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut keys = Vec::with_capacity(row.len());

    for cell in row {
        let base = cell_value(cell)
            .map(|v| v.to_string())
            .unwrap_or_else(|| EMPTY_HEADER.to_string());

        let key = match seen.get(&base).copied() {
            None => base.clone(),
            Some(mut counter) => {
                let mut candidate = format!("{}_{}", base, counter);
                while seen.contains_key(&candidate) {
                    counter += 1;
                    candidate = format!("{}_{}", base, counter);
                }
                seen.insert(base.clone(), counter + 1);
                candidate
            }
        };

        seen.entry(base).or_insert(1);
        seen.insert(key.clone(), 1);
        keys.push(key);
    }

    keys
}

/// Converts a decoded cell, returning `None` for cells that carry no value.
pub fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Int(i) => Some(CellValue::Int(*i)),
        Data::Float(f) => Some(number(*f)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) if dt.is_duration() => Some(number(dt.as_f64())),
        Data::DateTime(dt) => Some(
            dt.as_datetime()
                .map(CellValue::DateTime)
                .unwrap_or_else(|| number(dt.as_f64())),
        ),
        Data::DateTimeIso(s) => Some(
            parse_iso_datetime(s)
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::Text(s.clone())),
        ),
        Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(e) => Some(CellValue::Text(e.to_string())),
    }
}

/// Spreadsheets store every number as a float; whole values become integers.
fn number(f: f64) -> CellValue {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        CellValue::Int(f as i64)
    } else {
        CellValue::Float(f)
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

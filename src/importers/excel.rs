//! Excel workbook reader
//!
//! Reads the first sheet of a workbook. The first row is the header row;
//! every following row becomes a row of [`Cell`]s. Leading blank rows before
//! the header are skipped, as spreadsheet exports often start with padding.

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, TimeDelta};
use std::path::Path;
use tracing::{debug, info};

use super::table_name;
use crate::table::{Cell, Table};

/// Parse the first sheet of an Excel/ODS file into a [`Table`]
pub fn read_excel_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    info!("Reading workbook: {:?}", path);

    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("Failed to open workbook {:?}", path))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook has no sheets: {:?}", path))?
        .with_context(|| format!("Failed to read first sheet of {:?}", path))?;

    let mut rows = range
        .rows()
        .skip_while(|row| row.iter().all(|cell| matches!(cell, Data::Empty)));

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(header_text).collect(),
        None => return Err(anyhow!("Empty sheet in {:?}", path)),
    };
    debug!("Headers: {:?}", headers);

    let data_rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(to_cell).collect())
        .collect();

    info!("Read {} rows from {:?}", data_rows.len(), path);
    Ok(Table::new(table_name(path), headers, data_rows))
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Convert a calamine cell into a core cell
pub(crate) fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::text(s.clone()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(Cell::Date)
            .unwrap_or(Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s.clone()),
    }
}

/// Excel serial day number (1900 date system) to a calendar date
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    let excel_epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    excel_epoch.checked_add_signed(TimeDelta::try_days(serial.floor() as i64)?)
}

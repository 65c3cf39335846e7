//! Typed tabular model handed over by the acquisition layer
//!
//! Spreadsheets and CSV exports arrive as a header row plus rows of loosely
//! typed cells. The core never sees calamine or csv types: importers convert
//! into [`Table`] once, and each component projects the columns it needs
//! through [`Table::require_columns`], which is where the schema is enforced.

use chrono::NaiveDate;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::CotistasError;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(n) => n.is_nan(),
            Cell::Date(_) => false,
        }
    }

    /// Textual form of the cell. Dates use the source export's `dd.mm.yyyy`.
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    /// Numeric coercion. Blank or unparsable cells yield `None`.
    ///
    /// Text accepts plain decimals (`1500.5`) and Brazilian formatting
    /// (`R$ 1.500,50`); a comma selects the Brazilian reading.
    ///
    /// Numbers beyond the `Decimal` range (about 7.9e28) are rejected like
    /// unparsable text, with a warning.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Cell::Number(n) if n.is_finite() => {
                let value = Decimal::from_f64_retain(*n);
                if value.is_none() {
                    warn!("Amount {} is out of range, treated as missing", n);
                }
                value
            }
            Cell::Text(s) => parse_decimal_text(s),
            _ => None,
        }
    }

    /// Integer coercion used for explicit IDs. Fractional values are rejected.
    pub fn as_i32(&self) -> Option<i32> {
        let value = match self {
            Cell::Number(n) if n.is_finite() => Decimal::from_f64(*n)?,
            Cell::Text(s) => Decimal::from_str(s.trim()).ok()?,
            _ => return None,
        };
        if !value.fract().is_zero() {
            return None;
        }
        value.to_i32()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Date(d) => write!(f, "{}", d.format("%d.%m.%Y")),
        }
    }
}

fn parse_decimal_text(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }

    let cleaned = if trimmed.contains(',') {
        trimmed
            .replace("R$", "")
            .replace(' ', "")
            .replace('.', "")
            .replace(',', ".")
    } else {
        trimmed.replace("R$", "").replace(' ', "")
    };

    Decimal::from_str(&cleaned).ok()
}

/// A parsed table: named columns and rows of cells
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Where the table came from (file name), used in error messages
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Index of a column by exact (case-sensitive) header name
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Resolve every required column or fail naming all the missing ones
    pub fn require_columns<const N: usize>(
        &self,
        required: [&str; N],
    ) -> Result<[usize; N], CotistasError> {
        let mut missing = Vec::new();
        let mut indices = [0usize; N];

        for (slot, header) in indices.iter_mut().zip(required) {
            match self.column(header) {
                Some(idx) => *slot = idx,
                None => missing.push(header.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(indices)
        } else {
            Err(CotistasError::MissingColumns {
                table: self.name.clone(),
                columns: missing,
            })
        }
    }

    /// Copy of the table with headers trimmed and upper-cased
    pub fn with_upper_headers(&self) -> Self {
        Self {
            name: self.name.clone(),
            headers: self
                .headers
                .iter()
                .map(|h| h.trim().to_uppercase())
                .collect(),
            rows: self.rows.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cell lookup that tolerates ragged rows
pub(crate) fn cell(row: &[Cell], idx: usize) -> &Cell {
    static EMPTY: Cell = Cell::Empty;
    row.get(idx).unwrap_or(&EMPTY)
}

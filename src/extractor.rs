//! Transaction batch extraction
//!
//! A batch is one exported movements table with the columns `TITULAR`,
//! `DT.TRANSAÇÃO`, `APLICAR`, `RESGATAR` and `FUNDO`. Each holder block in
//! the export closes with a summary line whose TITULAR contains
//! `"TOTAL DA MOVIMENTAÇÃO:"`; those lines are not transactions.
//!
//! TITULAR carries a fixed-width code prefix (`"99999-JOHN DOE"`) which is
//! cut off before the name is normalized.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::Settings;
use crate::error::CotistasError;
use crate::normalize::Normalizer;
use crate::table::{cell, Table};

pub const HOLDER_COLUMN: &str = "TITULAR";
pub const DATE_COLUMN: &str = "DT.TRANSAÇÃO";
pub const APPLY_COLUMN: &str = "APLICAR";
pub const REDEEM_COLUMN: &str = "RESGATAR";
pub const FUND_COLUMN: &str = "FUNDO";

/// Columns every batch must carry, exactly as exported
pub const REQUIRED_COLUMNS: [&str; 5] = [
    HOLDER_COLUMN,
    DATE_COLUMN,
    APPLY_COLUMN,
    REDEEM_COLUMN,
    FUND_COLUMN,
];

/// One transaction row after projection and cleanup
#[derive(Debug, Clone, PartialEq)]
pub struct RawTransaction {
    /// TITULAR as exported
    pub holder_label: String,
    /// Matching key of the holder name (prefix cut, normalized)
    pub holder_key: String,
    pub date: String,
    pub apply_amount: Option<Decimal>,
    pub redeem_amount: Option<Decimal>,
    /// FUNDO as exported
    pub fund_name: String,
    /// Matching key of the fund name
    pub fund_key: String,
}

/// Extraction rules that vary per deployment
#[derive(Debug, Clone)]
pub struct Extractor {
    normalizer: Normalizer,
    prefix_width: usize,
    total_marker: String,
}

impl Extractor {
    pub fn new(normalizer: Normalizer, prefix_width: usize, total_marker: impl Into<String>) -> Self {
        Self {
            normalizer,
            prefix_width,
            total_marker: total_marker.into(),
        }
    }

    pub fn from_settings(settings: &Settings, normalizer: Normalizer) -> Self {
        Self::new(
            normalizer,
            settings.holder_prefix_width,
            settings.total_marker.clone(),
        )
    }

    /// Check the batch schema and return a lazy view over its transactions.
    ///
    /// The schema check happens here, before any row is read: a batch missing
    /// a column is rejected as a whole.
    pub fn extract<'a>(&'a self, table: &'a Table) -> Result<Transactions<'a>, CotistasError> {
        let columns = table.require_columns(REQUIRED_COLUMNS)?;
        debug!("Extracting {} rows from '{}'", table.len(), table.name);
        Ok(Transactions {
            extractor: self,
            table,
            columns,
            next_row: 0,
        })
    }

    pub fn is_summary_row(&self, holder_label: &str) -> bool {
        holder_label.contains(&self.total_marker)
    }

    /// Holder name with the code prefix cut off and surrounding spaces trimmed
    pub fn strip_holder_prefix<'s>(&self, holder_label: &'s str) -> &'s str {
        let start = holder_label
            .char_indices()
            .nth(self.prefix_width)
            .map(|(idx, _)| idx)
            .unwrap_or(holder_label.len());
        holder_label[start..].trim()
    }
}

/// Lazy, restartable iterator over the transactions of one batch
///
/// Cloning yields an independent cursor at the same position.
#[derive(Debug, Clone)]
pub struct Transactions<'a> {
    extractor: &'a Extractor,
    table: &'a Table,
    columns: [usize; 5],
    next_row: usize,
}

impl Iterator for Transactions<'_> {
    type Item = RawTransaction;

    fn next(&mut self) -> Option<Self::Item> {
        let [holder_idx, date_idx, apply_idx, redeem_idx, fund_idx] = self.columns;

        while let Some(row) = self.table.rows.get(self.next_row) {
            let row_num = self.next_row + 2;
            self.next_row += 1;

            if [holder_idx, date_idx, apply_idx, redeem_idx, fund_idx]
                .iter()
                .all(|&idx| cell(row, idx).is_blank())
            {
                debug!("Skipping blank row {} in '{}'", row_num, self.table.name);
                continue;
            }

            let holder_label = cell(row, holder_idx).as_text();
            if self.extractor.is_summary_row(&holder_label) {
                debug!("Skipping summary row {} in '{}'", row_num, self.table.name);
                continue;
            }

            let normalizer = &self.extractor.normalizer;
            let holder_key =
                normalizer.normalize_for_matching(self.extractor.strip_holder_prefix(&holder_label));
            let fund_name = cell(row, fund_idx).as_text();

            return Some(RawTransaction {
                holder_key,
                holder_label,
                date: cell(row, date_idx).as_text(),
                apply_amount: cell(row, apply_idx).as_decimal(),
                redeem_amount: cell(row, redeem_idx).as_decimal(),
                fund_key: normalizer.normalize_for_matching(&fund_name),
                fund_name,
            });
        }

        None
    }
}

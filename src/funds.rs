//! Fund directory: fund name -> numeric fund ID
//!
//! Fund tables come from the fund registry exports. Their headers are
//! trimmed and upper-cased before use; `FUNDO` is required and `ID_FUNDO`
//! is optional. When no fund table has `ID_FUNDO`, IDs come from the
//! configured fund table, and names missing from it land in the catch-all
//! default ID. Blank `ID_FUNDO` cells also get the default.
//! The same default answers lookups for funds the directory never saw.

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::CotistasError;
use crate::normalize::Normalizer;
use crate::table::{cell, Cell, Table};

const FUND_COLUMN: &str = "FUNDO";
const FUND_ID_COLUMN: &str = "ID_FUNDO";

/// A fund as loaded from the registry exports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fund {
    pub raw_name: String,
    pub normalized_name: String,
    pub id: i32,
}

/// Configured name -> ID pairs, keyed by matching-normalized name
#[derive(Debug, Clone)]
pub struct FundIdTable {
    ids: HashMap<String, i32>,
    default_id: i32,
}

impl FundIdTable {
    pub fn new(entries: &BTreeMap<String, i32>, default_id: i32, normalizer: &Normalizer) -> Self {
        let ids = entries
            .iter()
            .map(|(name, id)| (normalizer.normalize_for_matching(name), *id))
            .collect();
        Self { ids, default_id }
    }

    pub fn from_settings(settings: &Settings, normalizer: &Normalizer) -> Self {
        Self::new(&settings.fund_ids, settings.default_fund_id, normalizer)
    }

    pub fn get(&self, normalized_name: &str) -> Option<i32> {
        self.ids.get(normalized_name).copied()
    }

    pub fn default_id(&self) -> i32 {
        self.default_id
    }
}

/// Loaded funds plus the normalized-name index used by reconciliation
#[derive(Debug, Clone)]
pub struct FundDirectory {
    funds: Vec<Fund>,
    index: HashMap<String, i32>,
    default_id: i32,
}

impl FundDirectory {
    /// Directory with no funds: every lookup yields the default ID
    pub fn empty(default_id: i32) -> Self {
        Self {
            funds: Vec::new(),
            index: HashMap::new(),
            default_id,
        }
    }

    /// Load funds from one or more fund tables, in order.
    ///
    /// The tables are treated as one concatenated table: if any of them
    /// carries `ID_FUNDO`, every row takes its ID from that column, and rows
    /// with a blank cell (or from a table without the column) get the default
    /// ID. Otherwise IDs come from the configured table.
    ///
    /// Duplicate names keep the ID of the last row seen.
    pub fn load(
        tables: &[Table],
        id_table: &FundIdTable,
        normalizer: &Normalizer,
    ) -> Result<Self, CotistasError> {
        let mut directory = Self::empty(id_table.default_id());

        let tables: Vec<Table> = tables.iter().map(Table::with_upper_headers).collect();
        let explicit_ids = tables.iter().any(|t| t.column(FUND_ID_COLUMN).is_some());
        if explicit_ids {
            debug!("Fund tables carry {}, configured IDs are not used", FUND_ID_COLUMN);
        }

        for table in &tables {
            directory.load_table(table, explicit_ids, id_table, normalizer)?;
        }

        info!(
            "Loaded {} funds ({} distinct names) from {} table(s)",
            directory.funds.len(),
            directory.index.len(),
            tables.len()
        );
        Ok(directory)
    }

    fn load_table(
        &mut self,
        table: &Table,
        explicit_ids: bool,
        id_table: &FundIdTable,
        normalizer: &Normalizer,
    ) -> Result<(), CotistasError> {
        let [name_idx] = table.require_columns([FUND_COLUMN])?;
        let id_idx = table.column(FUND_ID_COLUMN);

        for (row_idx, row) in table.rows.iter().enumerate() {
            let raw_name = cell(row, name_idx).as_text();
            let normalized_name = normalizer.normalize_for_matching(&raw_name);

            let id = if explicit_ids {
                let id_cell = match id_idx {
                    Some(idx) => cell(row, idx),
                    None => &Cell::Empty,
                };
                if id_cell.is_blank() {
                    id_table.default_id()
                } else {
                    id_cell.as_i32().ok_or_else(|| CotistasError::InvalidFundId {
                        row: row_idx + 2,
                        value: id_cell.as_text(),
                    })?
                }
            } else {
                self.resolve_configured_id(&normalized_name, id_table)
            };

            if let Some(previous) = self.index.insert(normalized_name.clone(), id) {
                if previous != id {
                    warn!(
                        "Fund '{}' appears with IDs {} and {}; keeping {}",
                        normalized_name, previous, id, id
                    );
                }
            }

            self.funds.push(Fund {
                raw_name,
                normalized_name,
                id,
            });
        }

        Ok(())
    }

    fn resolve_configured_id(&self, normalized_name: &str, id_table: &FundIdTable) -> i32 {
        id_table.get(normalized_name).unwrap_or_else(|| {
            debug!(
                "Fund '{}' not in the ID table, using default {}",
                normalized_name,
                id_table.default_id()
            );
            id_table.default_id()
        })
    }

    /// Exact lookup by matching-normalized name
    pub fn get(&self, normalized_name: &str) -> Option<i32> {
        self.index.get(normalized_name).copied()
    }

    /// Fund ID for a normalized name; the catch-all default on a miss
    pub fn fund_id_or_default(&self, normalized_name: &str) -> i32 {
        self.get(normalized_name).unwrap_or(self.default_id)
    }

    pub fn default_id(&self) -> i32 {
        self.default_id
    }

    pub fn funds(&self) -> &[Fund] {
        &self.funds
    }
}

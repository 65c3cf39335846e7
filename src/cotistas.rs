//! Cotista roster: holder name -> client code
//!
//! The roster export has a `Nome` column with the holder's name and a
//! `Cliente` column with the client code, which the export writes as a
//! float-looking string (`"4821.0"`). Only the part before the first `.`
//! is the code.
//!
//! Two roster rows whose names normalize to the same key collide; the later
//! row wins and the collision is logged, because the export does contain
//! such duplicates.

use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

use crate::error::CotistasError;
use crate::normalize::Normalizer;
use crate::table::{cell, Table};

const NAME_COLUMN: &str = "Nome";
const CLIENT_COLUMN: &str = "Cliente";

/// Literal written to the PRN when a holder has no client code
pub const UNMATCHED_CLIENT_CODE: &str = "nan";

/// Client code of a movement
///
/// `Unmatched` renders as `"nan"`: the downstream system and the people
/// reviewing its input already recognize that literal, so the PRN keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClientCode {
    Code(String),
    Unmatched,
}

impl ClientCode {
    /// Canonical code from the roster's textual identifier
    pub fn from_identifier(identifier: &str) -> Self {
        let code = identifier.split('.').next().unwrap_or("").trim();
        if code.is_empty() || code.eq_ignore_ascii_case(UNMATCHED_CLIENT_CODE) {
            ClientCode::Unmatched
        } else {
            ClientCode::Code(code.to_string())
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, ClientCode::Code(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ClientCode::Code(code) => code,
            ClientCode::Unmatched => UNMATCHED_CLIENT_CODE,
        }
    }
}

impl fmt::Display for ClientCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A roster entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cotista {
    pub raw_name: String,
    pub normalized_name: String,
    pub client_code: ClientCode,
}

/// Roster indexed by matching-normalized name
#[derive(Debug, Clone, Default)]
pub struct CotistaRegistry {
    entries: HashMap<String, Cotista>,
    collisions: usize,
}

impl CotistaRegistry {
    pub fn load(table: &Table, normalizer: &Normalizer) -> Result<Self, CotistasError> {
        let [name_idx, client_idx] = table.require_columns([NAME_COLUMN, CLIENT_COLUMN])?;
        let mut registry = Self::default();

        for row in &table.rows {
            let raw_name = cell(row, name_idx).as_text();
            let cotista = Cotista {
                normalized_name: normalizer.normalize_for_matching(&raw_name),
                client_code: ClientCode::from_identifier(&cell(row, client_idx).as_text()),
                raw_name,
            };
            registry.insert(cotista);
        }

        info!(
            "Loaded {} cotistas from {} roster rows ({} name collisions)",
            registry.entries.len(),
            table.len(),
            registry.collisions
        );
        Ok(registry)
    }

    /// Insert an entry; a later entry with the same key replaces the earlier one
    pub fn insert(&mut self, cotista: Cotista) {
        let key = cotista.normalized_name.clone();
        if let Some(previous) = self.entries.insert(key.clone(), cotista) {
            self.collisions += 1;
            warn!(
                "Roster names '{}' and '{}' both normalize to '{}'; keeping client {}",
                previous.raw_name,
                self.entries[&key].raw_name,
                key,
                self.entries[&key].client_code
            );
        }
    }

    pub fn get(&self, normalized_name: &str) -> Option<&Cotista> {
        self.entries.get(normalized_name)
    }

    /// Client code for a normalized holder name; `Unmatched` on a miss
    pub fn client_code_or_unmatched(&self, normalized_name: &str) -> ClientCode {
        self.get(normalized_name)
            .map(|c| c.client_code.clone())
            .unwrap_or(ClientCode::Unmatched)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of roster rows that overwrote an earlier row
    pub fn collisions(&self) -> usize {
        self.collisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn roster(rows: Vec<(&str, Cell)>) -> Table {
        Table::new(
            "cotistas.csv",
            vec!["Nome".to_string(), "Cliente".to_string()],
            rows.into_iter()
                .map(|(name, client)| vec![Cell::text(name), client])
                .collect(),
        )
    }

    #[test]
    fn test_client_code_from_identifier() {
        assert_eq!(
            ClientCode::from_identifier("4821.0"),
            ClientCode::Code("4821".to_string())
        );
        assert_eq!(
            ClientCode::from_identifier("4821"),
            ClientCode::Code("4821".to_string())
        );
        assert_eq!(
            ClientCode::from_identifier("12.34.56"),
            ClientCode::Code("12".to_string())
        );
        assert_eq!(ClientCode::from_identifier(""), ClientCode::Unmatched);
        assert_eq!(ClientCode::from_identifier("nan"), ClientCode::Unmatched);
        assert_eq!(ClientCode::Unmatched.to_string(), "nan");
    }

    #[test]
    fn test_lookup_by_normalized_name() {
        let normalizer = Normalizer::default();
        let table = roster(vec![
            ("john  doe", Cell::text("4821.0")),
            ("Maria Conceição", Cell::Number(77.0)),
        ]);
        let registry = CotistaRegistry::load(&table, &normalizer).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.client_code_or_unmatched("JOHNDOE"),
            ClientCode::Code("4821".to_string())
        );
        assert_eq!(
            registry.client_code_or_unmatched("MARIACONCEICAO"),
            ClientCode::Code("77".to_string())
        );
        assert_eq!(
            registry.client_code_or_unmatched("NINGUEM"),
            ClientCode::Unmatched
        );
    }

    #[test]
    fn test_collisions_last_write_wins() {
        let normalizer = Normalizer::default();
        let table = roster(vec![
            ("Ana Souza", Cell::text("1.0")),
            ("ANA  SOUZA", Cell::text("2.0")),
        ]);
        let registry = CotistaRegistry::load(&table, &normalizer).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.collisions(), 1);
        let entry = registry.get("ANASOUZA").unwrap();
        assert_eq!(entry.raw_name, "ANA  SOUZA");
        assert_eq!(entry.client_code, ClientCode::Code("2".to_string()));
    }

    #[test]
    fn test_missing_columns() {
        let normalizer = Normalizer::default();
        let table = Table::new("cotistas.csv", vec!["NOME".to_string()], vec![]);
        let err = CotistaRegistry::load(&table, &normalizer).unwrap_err();
        match err {
            CotistasError::MissingColumns { columns, .. } => {
                assert_eq!(columns, vec!["Nome", "Cliente"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

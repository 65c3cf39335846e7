use anyhow::{Context, Result};
use csv::ReaderBuilder;
use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::table_name;
use crate::table::{Cell, Table};

/// Roster exports use semicolons
const DELIMITER: u8 = b';';

/// Parse a semicolon-delimited export into a [`Table`]
pub fn read_csv_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    info!("Reading CSV file: {:?}", path);

    let bytes = fs::read(path).with_context(|| format!("Failed to read CSV file {:?}", path))?;
    let mut table = parse_csv_bytes(&bytes)?;
    table.name = table_name(path);

    info!("Read {} rows from {:?}", table.len(), path);
    Ok(table)
}

/// Parse CSV content. UTF-8 is tried first; legacy exports are Windows-1252.
pub fn parse_csv_bytes(bytes: &[u8]) -> Result<Table> {
    let content = decode(bytes);

    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true) // Allow variable number of columns
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    debug!("CSV headers: {:?}", headers);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.context("Failed to read CSV record")?;
        rows.push(record.iter().map(Cell::text).collect());
    }

    Ok(Table::new("", headers, rows))
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            debug!("CSV is not UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = WINDOWS_1252.decode(bytes);
            decoded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_semicolon_csv() {
        let table = parse_csv_bytes("Nome;Cliente\njohn  doe;4821.0\nMaria;\n".as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["Nome", "Cliente"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Text("john  doe".to_string()));
        assert_eq!(table.rows[0][1], Cell::Text("4821.0".to_string()));
        assert_eq!(table.rows[1][1], Cell::Empty);
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let table = parse_csv_bytes(b"\xEF\xBB\xBFNome;Cliente\nA;1\n").unwrap();
        assert_eq!(table.column("Nome"), Some(0));
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "João" in Windows-1252
        let table = parse_csv_bytes(b"Nome;Cliente\nJo\xE3o;1\n").unwrap();
        assert_eq!(table.rows[0][0], Cell::Text("João".to_string()));
    }
}

use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::debug;

/// How a table file is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Excel/ODS workbook, first sheet
    Spreadsheet,
    /// Semicolon-delimited text
    Delimited,
}

const SPREADSHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "xlsm", "ods"];
const DELIMITED_EXTENSIONS: [&str; 2] = ["csv", "txt"];

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Detect the table format from the file extension
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<TableFormat> {
    let path = path.as_ref();
    let extension = extension(path).ok_or_else(|| anyhow!("File has no extension: {:?}", path))?;

    let format = if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        TableFormat::Spreadsheet
    } else if DELIMITED_EXTENSIONS.contains(&extension.as_str()) {
        TableFormat::Delimited
    } else {
        return Err(anyhow!(
            "Unsupported file format: {}. Supported formats: .xlsx, .xls, .xlsm, .ods, .csv, .txt",
            extension
        ));
    };

    debug!("Detected {:?} format for {:?}", format, path);
    Ok(format)
}

/// Batch directories only pick up Excel workbooks
pub(crate) fn is_spreadsheet(path: &Path) -> bool {
    matches!(extension(path).as_deref(), Some("xlsx") | Some("xls"))
}

// Import module - spreadsheet and CSV exports into tables

pub mod csv_table;
pub mod excel;
mod file_detector;

use anyhow::{anyhow, Context};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::Result;
use crate::table::Table;

pub use file_detector::{detect_format, TableFormat};

/// A file that could not be read
#[derive(Debug)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: anyhow::Error,
}

/// Tables read from a directory plus the files that failed
#[derive(Debug, Default)]
pub struct BatchLoad {
    pub tables: Vec<Table>,
    pub failures: Vec<BatchFailure>,
}

/// Read one table file (auto-detects spreadsheet vs CSV by extension)
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    match detect_format(path)? {
        TableFormat::Spreadsheet => excel::read_excel_table(path),
        TableFormat::Delimited => csv_table::read_csv_table(path),
    }
}

/// Read every spreadsheet in `dir`, in file-name order.
///
/// A file that fails to parse is recorded in `failures` and the rest are
/// still loaded.
pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<BatchLoad> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(anyhow!("Directory not found: {:?}", dir));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list directory {:?}", dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && file_detector::is_spreadsheet(path))
        .collect();
    paths.sort();

    info!("Found {} spreadsheet(s) in {:?}", paths.len(), dir);

    let mut load = BatchLoad::default();
    for path in paths {
        match read_table(&path) {
            Ok(table) => load.tables.push(table),
            Err(error) => {
                warn!("Failed to read {:?}: {:#}", path, error);
                load.failures.push(BatchFailure { path, error });
            }
        }
    }

    Ok(load)
}

/// File name used to label a table in messages
pub(crate) fn table_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

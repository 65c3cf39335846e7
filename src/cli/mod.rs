use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser)]
#[command(name = "cotistas")]
#[command(
    version,
    about = "Reconciles fund movements against the cotista roster and writes PRN files"
)]
#[command(
    long_about = "Reads the cotista roster, the fund registry exports and one or more movement batches, \
matches every movement to a client code and a fund ID, and writes the fixed-width PRN file consumed by the \
back-office system. Unknown holders are written as 'nan' and unknown funds get the default fund ID, so \
nothing is dropped silently."
)]
pub struct Cli {
    /// Settings file (TOML); defaults to the user config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile movement batches and write the PRN file
    Generate {
        /// Cotista roster (CSV with Nome;Cliente, or a spreadsheet)
        #[arg(long)]
        cotistas: PathBuf,

        /// Directory with the fund registry spreadsheets
        #[arg(long)]
        fundos: Option<PathBuf>,

        /// Directory with the movement batch spreadsheets
        #[arg(long)]
        movimentacoes: PathBuf,

        /// Output PRN file
        #[arg(short, long, default_value = "movimentacoes.prn")]
        output: PathBuf,

        /// Number of movements shown in the preview
        #[arg(long, default_value_t = 20)]
        preview: usize,

        /// Preview only, don't write the PRN file
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Inspect the headers of a table file
    Inspect {
        /// Path to the Excel or CSV file
        file: PathBuf,
    },

    /// Print the effective settings
    Config,
}

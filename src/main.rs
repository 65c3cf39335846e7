mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{formatters, Cli, Commands};
use colored::Colorize;
use std::fs;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cotistas::config::Settings;
use cotistas::importers::{self, BatchLoad};
use cotistas::pipeline;

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for --json
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let settings = Settings::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            cotistas,
            fundos,
            movimentacoes,
            output,
            preview,
            dry_run,
        } => handle_generate(
            &settings,
            &cotistas,
            fundos.as_deref(),
            &movimentacoes,
            &output,
            preview,
            dry_run,
            cli.json,
        ),

        Commands::Inspect { file } => handle_inspect(&file),

        Commands::Config => {
            print!("{}", settings.to_toml_string()?);
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_generate(
    settings: &Settings,
    roster_path: &Path,
    funds_dir: Option<&Path>,
    batches_dir: &Path,
    output_path: &Path,
    preview: usize,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    info!("Reading cotista roster from {:?}", roster_path);
    let roster = importers::read_table(roster_path)
        .with_context(|| format!("Failed to read cotista roster {:?}", roster_path))?;

    let funds = match funds_dir {
        Some(dir) => importers::load_dir(dir)
            .with_context(|| format!("Failed to load fund registry from {:?}", dir))?,
        None => BatchLoad::default(),
    };

    let batches = importers::load_dir(batches_dir)
        .with_context(|| format!("Failed to load movement batches from {:?}", batches_dir))?;

    let run = pipeline::run(settings, &roster, &funds.tables, &batches.tables)?;

    let failures: Vec<_> = funds
        .failures
        .into_iter()
        .chain(batches.failures)
        .collect();

    if !dry_run {
        fs::write(output_path, &run.prn)
            .with_context(|| format!("Failed to write PRN file {:?}", output_path))?;
        info!("Wrote {} lines to {:?}", run.movements.len(), output_path);
    }

    if json {
        let written = (!dry_run).then(|| output_path.display().to_string());
        println!(
            "{}",
            formatters::format_run_json(&run, &failures, written.as_deref())
        );
        return Ok(());
    }

    if run.movements.is_empty() {
        print!("{}", formatters::format_no_movements());
    } else {
        println!(
            "\n{} Reconciled {} movements\n",
            "✓".green().bold(),
            run.movements.len()
        );
        println!("{}", formatters::format_movements_table(&run.movements, preview));
    }

    print!("{}", formatters::format_report(&run.report, &failures));

    if dry_run {
        println!("\n{} Dry run - no PRN file written", "ℹ".blue().bold());
    } else {
        println!(
            "\n{} PRN written to {}",
            "✓".green().bold(),
            output_path.display().to_string().cyan()
        );
    }

    Ok(())
}

fn handle_inspect(path: &Path) -> Result<()> {
    let table = importers::read_table(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    print!("{}", formatters::format_inspect(&table));
    Ok(())
}

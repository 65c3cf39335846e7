//! One reconciliation run
//!
//! roster + fund tables + movement batches -> movements + PRN text + report.
//!
//! Every batch is schema-checked before any row is reconciled, so a bad
//! batch stops the run without producing a partial file. Batches are
//! reconciled in the order given, rows in table order.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::Settings;
use crate::cotistas::CotistaRegistry;
use crate::error::CotistasError;
use crate::extractor::Extractor;
use crate::funds::{FundDirectory, FundIdTable};
use crate::normalize::Normalizer;
use crate::prn;
use crate::reconcile::{Movement, Reconciler};
use crate::table::Table;

/// Counters for the reviewer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub batches: usize,
    pub movements: usize,
    /// Summary and blank rows dropped during extraction
    pub skipped_rows: usize,
    pub unmatched_holders: usize,
    pub default_fund_ids: usize,
    pub funds_loaded: usize,
    pub cotistas_loaded: usize,
    pub roster_collisions: usize,
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub movements: Vec<Movement>,
    pub prn: String,
    pub report: RunReport,
}

/// Run the whole reconciliation over already-loaded tables
pub fn run(
    settings: &Settings,
    roster: &Table,
    fund_tables: &[Table],
    batches: &[Table],
) -> Result<RunOutput, CotistasError> {
    let normalizer = Normalizer::new(&settings.match_tokens);

    let id_table = FundIdTable::from_settings(settings, &normalizer);
    let funds = FundDirectory::load(fund_tables, &id_table, &normalizer)?;
    let cotistas = CotistaRegistry::load(roster, &normalizer)?;

    let extractor = Extractor::from_settings(settings, normalizer);
    let extracted = batches
        .iter()
        .map(|batch| extractor.extract(batch))
        .collect::<Result<Vec<_>, _>>()?;

    let reconciler = Reconciler::new(&cotistas, &funds);
    let movements: Vec<Movement> = extracted
        .into_iter()
        .flat_map(|transactions| reconciler.reconcile(transactions))
        .collect();

    let report = RunReport {
        batches: batches.len(),
        movements: movements.len(),
        skipped_rows: batches.iter().map(Table::len).sum::<usize>() - movements.len(),
        unmatched_holders: movements.iter().filter(|m| m.is_unmatched()).count(),
        default_fund_ids: movements
            .iter()
            .filter(|m| funds.get(&m.fund_key).is_none())
            .count(),
        funds_loaded: funds.funds().len(),
        cotistas_loaded: cotistas.len(),
        roster_collisions: cotistas.collisions(),
    };

    if report.unmatched_holders > 0 {
        warn!(
            "{} of {} movements have no matching cotista",
            report.unmatched_holders, report.movements
        );
    }
    if report.default_fund_ids > 0 {
        warn!(
            "{} movements reference funds missing from the directory (ID {})",
            report.default_fund_ids,
            funds.default_id()
        );
    }

    let prn = prn::encode(&movements);
    info!(
        "Reconciled {} movements from {} batch(es)",
        report.movements, report.batches
    );

    Ok(RunOutput {
        movements,
        prn,
        report,
    })
}

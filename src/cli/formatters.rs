//! Output formatters for the CLI
//!
//! Terminal output uses tabled + colored; `--json` output uses serde_json.

use colored::Colorize;
use serde::Serialize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use cotistas::extractor::REQUIRED_COLUMNS;
use cotistas::importers::BatchFailure;
use cotistas::pipeline::{RunOutput, RunReport};
use cotistas::prn::{format_amount, format_date};
use cotistas::reconcile::Movement;

#[derive(Serialize)]
struct JsonMovement {
    fund_id: i32,
    client_code: String,
    direction: String,
    date: String,
    amount: String,
    holder: String,
    fund: String,
}

impl From<&Movement> for JsonMovement {
    fn from(m: &Movement) -> Self {
        Self {
            fund_id: m.fund_id,
            client_code: m.client_code.to_string(),
            direction: m.direction.to_string(),
            date: format_date(&m.date),
            amount: format_amount(m.amount),
            holder: m.holder_key.clone(),
            fund: m.fund_key.clone(),
        }
    }
}

#[derive(Serialize)]
struct JsonFailure {
    file: String,
    error: String,
}

#[derive(Serialize)]
struct JsonRun<'a> {
    report: &'a RunReport,
    failures: Vec<JsonFailure>,
    output: Option<String>,
    movements: Vec<JsonMovement>,
}

/// Format a run (report, failures and every movement) as JSON
pub fn format_run_json(
    output: &RunOutput,
    failures: &[BatchFailure],
    written_to: Option<&str>,
) -> String {
    let json = JsonRun {
        report: &output.report,
        failures: failures
            .iter()
            .map(|f| JsonFailure {
                file: f.path.display().to_string(),
                error: format!("{:#}", f.error),
            })
            .collect(),
        output: written_to.map(|s| s.to_string()),
        movements: output.movements.iter().map(JsonMovement::from).collect(),
    };

    serde_json::to_string_pretty(&json)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format the first `limit` movements as a terminal table
pub fn format_movements_table(movements: &[Movement], limit: usize) -> String {
    #[derive(Tabled)]
    struct MovementRow {
        #[tabled(rename = "Fundo")]
        fund_id: String,
        #[tabled(rename = "Cliente")]
        client_code: String,
        #[tabled(rename = "Tipo")]
        direction: String,
        #[tabled(rename = "Data")]
        date: String,
        #[tabled(rename = "Valor")]
        amount: String,
        #[tabled(rename = "Titular")]
        holder: String,
    }

    let rows: Vec<MovementRow> = movements
        .iter()
        .take(limit)
        .map(|m| {
            let client = if m.is_unmatched() {
                m.client_code.to_string().yellow().bold().to_string()
            } else {
                m.client_code.to_string()
            };

            MovementRow {
                fund_id: m.fund_id.to_string(),
                client_code: client,
                direction: m.direction.to_string(),
                date: format_date(&m.date),
                amount: format_amount(m.amount),
                holder: m.holder_key.clone(),
            }
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(4..5), Alignment::right());

    let mut output = table.to_string();
    if movements.len() > limit {
        output.push_str(&format!(
            "\n{}",
            format!("... and {} more movement(s)", movements.len() - limit).bright_black()
        ));
    }
    output
}

/// Format the run summary and any batch failures
pub fn format_report(report: &RunReport, failures: &[BatchFailure]) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{} Summary", "━".repeat(60).bright_black()));
    output.push_str(&format!("\n{:<24} {}", "Batches:".bold(), report.batches));
    output.push_str(&format!("\n{:<24} {}", "Movements:".bold(), report.movements));
    output.push_str(&format!("\n{:<24} {}", "Rows skipped:".bold(), report.skipped_rows));
    output.push_str(&format!("\n{:<24} {}", "Cotistas loaded:".bold(), report.cotistas_loaded));
    output.push_str(&format!("\n{:<24} {}", "Funds loaded:".bold(), report.funds_loaded));

    let unmatched = report.unmatched_holders.to_string();
    output.push_str(&format!(
        "\n{:<24} {}",
        "Unmatched holders:".bold(),
        if report.unmatched_holders > 0 { unmatched.yellow() } else { unmatched.green() }
    ));

    let defaulted = report.default_fund_ids.to_string();
    output.push_str(&format!(
        "\n{:<24} {}",
        "Default fund IDs:".bold(),
        if report.default_fund_ids > 0 { defaulted.yellow() } else { defaulted.green() }
    ));

    if report.roster_collisions > 0 {
        output.push_str(&format!(
            "\n{:<24} {}",
            "Roster collisions:".bold(),
            report.roster_collisions.to_string().yellow()
        ));
    }

    if !failures.is_empty() {
        output.push_str(&format!("\n\n{} Files skipped:", "⚠".yellow().bold()));
        for failure in failures {
            output.push_str(&format!(
                "\n  • {}: {:#}",
                failure.path.display().to_string().yellow(),
                failure.error
            ));
        }
    }

    output.push('\n');
    output
}

/// Format the headers of a table and which transaction columns it lacks
pub fn format_inspect(table: &cotistas::table::Table) -> String {
    let mut output = format!(
        "{} {}\n  Rows: {}\n  Columns: {}\n",
        "📄".cyan().bold(),
        table.name.green(),
        table.len(),
        table.headers.len()
    );

    for (idx, header) in table.headers.iter().enumerate() {
        output.push_str(&format!("    Col {}: {:?}\n", idx + 1, header));
    }

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| table.column(c).is_none())
        .collect();

    if missing.is_empty() {
        output.push_str(&format!(
            "{} Usable as a movement batch\n",
            "✓".green().bold()
        ));
    } else {
        output.push_str(&format!(
            "{} Not a movement batch, missing: {}\n",
            "ℹ".blue().bold(),
            missing.join(", ")
        ));
    }

    output
}

/// Format empty run message
pub fn format_no_movements() -> String {
    format!(
        "{} No movements found\nCheck the batch directory passed to {} generate --movimentacoes <dir>\n",
        "ℹ".blue().bold(),
        "cotistas".bold()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cotistas::cotistas::ClientCode;
    use cotistas::reconcile::Direction;
    use rust_decimal_macros::dec;

    fn movement(client: ClientCode) -> Movement {
        Movement {
            fund_id: 20731,
            client_code: client,
            direction: Direction::Apply,
            date: "15.03.2024".to_string(),
            amount: dec!(1500.5),
            holder_key: "JOHNDOE".to_string(),
            fund_key: "COTADEF2".to_string(),
        }
    }

    #[test]
    fn test_movements_table_lists_rows() {
        colored::control::set_override(false);
        let movements = vec![
            movement(ClientCode::Code("4821".to_string())),
            movement(ClientCode::Unmatched),
        ];
        let table = format_movements_table(&movements, 1);
        assert!(table.contains("4821"));
        assert!(table.contains("15/03/2024"));
        assert!(table.contains("000000001500,50"));
        assert!(!table.contains("nan"));
        assert!(table.contains("1 more movement"));
    }

    #[test]
    fn test_empty_run_message() {
        let msg = format_no_movements();
        assert!(msg.contains("No movements found"));
        assert!(msg.contains("generate"));
    }
}

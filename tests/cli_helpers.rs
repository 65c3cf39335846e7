#![allow(dead_code)]

use anyhow::{bail, Result};
use assert_cmd::cargo;
use rust_xlsxwriter::Workbook;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const BATCH_HEADERS: [&str; 5] = ["TITULAR", "DT.TRANSAÇÃO", "APLICAR", "RESGATAR", "FUNDO"];

/// One movement row as the export writes it
pub struct BatchRow<'a> {
    pub holder: &'a str,
    pub date: &'a str,
    pub apply: Option<f64>,
    pub redeem: Option<f64>,
    pub fund: &'a str,
}

pub fn write_roster_csv(path: &Path, rows: &[(&str, &str)]) {
    let mut content = String::from("Nome;Cliente\n");
    for (name, client) in rows {
        content.push_str(&format!("{};{}\n", name, client));
    }
    std::fs::write(path, content).expect("failed to write roster CSV");
}

pub fn write_batch_xlsx(path: &Path, rows: &[BatchRow]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Movimentações").unwrap();

    for (col, header) in BATCH_HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).unwrap();
    }

    for (idx, row) in rows.iter().enumerate() {
        let r = (idx + 1) as u32;
        worksheet.write_string(r, 0, row.holder).unwrap();
        if !row.date.is_empty() {
            worksheet.write_string(r, 1, row.date).unwrap();
        }
        if let Some(apply) = row.apply {
            worksheet.write_number(r, 2, apply).unwrap();
        }
        if let Some(redeem) = row.redeem {
            worksheet.write_number(r, 3, redeem).unwrap();
        }
        if !row.fund.is_empty() {
            worksheet.write_string(r, 4, row.fund).unwrap();
        }
    }

    workbook.save(path).expect("failed to save batch workbook");
}

pub fn write_funds_xlsx(path: &Path, funds: &[(&str, Option<i32>)]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let with_ids = funds.iter().any(|(_, id)| id.is_some());
    worksheet.write_string(0, 0, "Fundo").unwrap();
    if with_ids {
        worksheet.write_string(0, 1, "ID_FUNDO").unwrap();
    }

    for (idx, (name, id)) in funds.iter().enumerate() {
        let r = (idx + 1) as u32;
        worksheet.write_string(r, 0, *name).unwrap();
        if let Some(id) = id {
            worksheet.write_number(r, 1, *id as f64).unwrap();
        }
    }

    workbook.save(path).expect("failed to save funds workbook");
}

/// Temp layout with `cotistas.csv`, `fundos/` and `movimentacoes/`
pub struct Workspace {
    pub home: TempDir,
    pub root: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().expect("failed to create temp home"),
            root: TempDir::new().expect("failed to create temp workspace"),
        }
    }

    pub fn roster(&self) -> PathBuf {
        self.root.path().join("cotistas.csv")
    }

    pub fn funds_dir(&self) -> PathBuf {
        let dir = self.root.path().join("fundos");
        std::fs::create_dir_all(&dir).expect("failed to create fundos dir");
        dir
    }

    pub fn batches_dir(&self) -> PathBuf {
        let dir = self.root.path().join("movimentacoes");
        std::fs::create_dir_all(&dir).expect("failed to create movimentacoes dir");
        dir
    }

    pub fn output(&self) -> PathBuf {
        self.root.path().join("movimentacoes.prn")
    }

    /// Roster, one fund table and one batch with a summary row
    pub fn with_sample_data(self) -> Self {
        write_roster_csv(
            &self.roster(),
            &[("john  doe", "4821.0"), ("Maria Conceição", "77.0")],
        );
        write_funds_xlsx(
            &self.funds_dir().join("fundos.xlsx"),
            &[("COTADEF2", None), ("Fundo ABC S.A.", None)],
        );
        write_batch_xlsx(
            &self.batches_dir().join("lote1.xlsx"),
            &[
                BatchRow {
                    holder: "123456 JOHN DOE",
                    date: "15.03.2024",
                    apply: Some(1500.5),
                    redeem: None,
                    fund: "cotadef2",
                },
                BatchRow {
                    holder: "TOTAL DA MOVIMENTAÇÃO: 1.500,50",
                    date: "",
                    apply: Some(1500.5),
                    redeem: None,
                    fund: "",
                },
                BatchRow {
                    holder: "654321 FULANO",
                    date: "16.03.2024",
                    apply: None,
                    redeem: Some(200.0),
                    fund: "Fundo Inexistente",
                },
            ],
        );
        self
    }

    pub fn generate_args(&self) -> Vec<String> {
        vec![
            "generate".to_string(),
            "--cotistas".to_string(),
            self.roster().display().to_string(),
            "--fundos".to_string(),
            self.funds_dir().display().to_string(),
            "--movimentacoes".to_string(),
            self.batches_dir().display().to_string(),
            "--output".to_string(),
            self.output().display().to_string(),
        ]
    }
}

pub fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("cotistas"));
    cmd.env("HOME", home.path());
    cmd.env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd.env_remove("RUST_LOG");
    cmd.arg("--no-color");
    cmd
}

pub fn run_cmd(home: &TempDir, args: &[&str]) -> Result<Output> {
    let mut cmd = base_cmd(home);
    cmd.args(args);
    let output = cmd.output()?;
    if !output.status.success() {
        bail!(
            "command failed: {:?}\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

pub fn run_cmd_json(home: &TempDir, args: &[&str]) -> Result<Value> {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let output = run_cmd(home, &full)?;
    let stdout = String::from_utf8(output.stdout)?;
    Ok(serde_json::from_str(&stdout)?)
}

use anyhow::{Context, Result, bail};
use serde::Serialize;

use mailverify_lib::{MxRecord, Resolution, Status, SyntaxError, VerificationResult};

use crate::args::Cli;

/// One line of a report, whatever the subcommand.
pub trait Report: Serialize {
    fn human_lines(&self) -> Vec<String>;
    fn is_invalid(&self) -> bool;
    #[cfg_attr(not(feature = "with-csv"), allow(dead_code))]
    fn csv_record(&self) -> Vec<String>;
}

impl Report for VerificationResult {
    fn human_lines(&self) -> Vec<String> {
        let tag = match self.status() {
            Status::Valid => "[VALID]  ",
            Status::Risky => "[RISKY]  ",
            Status::Invalid => "[INVALID]",
        };
        let mut lines = match (self.status(), self.detail()) {
            (Status::Invalid, Some(detail)) => vec![format!("{tag} {} :: {detail}", self.email())],
            (Status::Risky, _) => vec![format!("{tag} {} :: catch-all domain", self.email())],
            _ => vec![format!("{tag} {}", self.email())],
        };
        lines.push(format!(
            "          syntax={} mx={} smtp_accepts={} catch_all={}",
            self.syntax(),
            self.mx(),
            self.smtp_accepts(),
            self.catch_all()
        ));
        lines
    }

    fn is_invalid(&self) -> bool {
        self.status() == Status::Invalid
    }

    fn csv_record(&self) -> Vec<String> {
        vec![
            self.email().to_string(),
            self.syntax().to_string(),
            self.mx().to_string(),
            self.smtp_accepts().to_string(),
            self.catch_all().to_string(),
            self.status().to_string(),
            self.detail().unwrap_or("").to_string(),
        ]
    }
}

#[derive(Serialize)]
pub struct SyntaxRow {
    pub email: String,
    pub syntax: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SyntaxRow {
    pub fn new(email: &str, check: Result<(), SyntaxError>) -> Self {
        Self {
            email: email.to_string(),
            syntax: check.is_ok(),
            reason: check.err().map(|err| err.to_string()),
        }
    }
}

impl Report for SyntaxRow {
    fn human_lines(&self) -> Vec<String> {
        match &self.reason {
            None => vec![format!("[OK]      {}", self.email)],
            Some(reason) => vec![format!("[INVALID] {} :: {reason}", self.email)],
        }
    }

    fn is_invalid(&self) -> bool {
        !self.syntax
    }

    fn csv_record(&self) -> Vec<String> {
        vec![
            self.email.clone(),
            self.syntax.to_string(),
            self.reason.clone().unwrap_or_default(),
        ]
    }
}

#[derive(Serialize)]
pub struct MxRow {
    pub domain: String,
    pub has_mx: bool,
    pub hosts: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<MxRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MxRow {
    pub fn new(domain: &str, resolution: &Resolution) -> Self {
        let records = match resolution {
            Resolution::Mx(records) => records.clone(),
            _ => Vec::new(),
        };
        Self {
            domain: domain.to_string(),
            has_mx: resolution.has_mx(),
            hosts: resolution.hosts(),
            records,
            error: resolution.failure().map(|cause| cause.to_string()),
        }
    }
}

impl Report for MxRow {
    fn human_lines(&self) -> Vec<String> {
        if let Some(error) = &self.error {
            return vec![format!("[NONE]    {} :: {error}", self.domain)];
        }
        if self.records.is_empty() {
            return vec![format!(
                "[IMPLICIT] {} :: no MX, address record {}",
                self.domain,
                self.hosts.join(", ")
            )];
        }
        let summary = self
            .records
            .iter()
            .map(|r| format!("{}:{}", r.preference, r.exchange))
            .collect::<Vec<_>>()
            .join(", ");
        vec![format!("[MX]      {} :: {summary}", self.domain)]
    }

    fn is_invalid(&self) -> bool {
        self.hosts.is_empty()
    }

    fn csv_record(&self) -> Vec<String> {
        vec![
            self.domain.clone(),
            self.has_mx.to_string(),
            self.hosts.join(";"),
            self.error.clone().unwrap_or_default(),
        ]
    }
}

pub fn any_invalid<R: Report>(rows: &[R]) -> bool {
    rows.iter().any(|row| row.is_invalid())
}

pub fn write_reports<R: Report>(rows: &[R], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => write_human(rows, cli),
        "json" => write_json(rows, cli),
        "ndjson" => write_ndjson(rows, cli),
        "csv" => write_csv(rows, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

fn write_human<R: Report>(rows: &[R], cli: &Cli) -> Result<()> {
    let mut text = String::new();
    for row in rows {
        for line in row.human_lines() {
            text.push_str(&line);
            text.push('\n');
        }
    }
    emit(cli, text.as_bytes())
}

fn write_json<R: Report>(rows: &[R], cli: &Cli) -> Result<()> {
    let mut s = serde_json::to_string_pretty(rows)?;
    s.push('\n');
    emit(cli, s.as_bytes())
}

fn write_ndjson<R: Report>(rows: &[R], cli: &Cli) -> Result<()> {
    let mut buf = Vec::new();
    for row in rows {
        let line = serde_json::to_string(row)?;
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
    }
    emit(cli, &buf)
}

#[cfg(feature = "with-csv")]
fn write_csv<R: Report>(rows: &[R], cli: &Cli) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in rows {
        wtr.write_record(row.csv_record())?;
    }
    let data = wtr.into_inner().context("flush csv")?;
    emit(cli, &data)
}

#[cfg(not(feature = "with-csv"))]
fn write_csv<R: Report>(_: &[R], _: &Cli) -> Result<()> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

fn emit(cli: &Cli, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    match &cli.out {
        Some(path) => write_all_atomically(path, bytes),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("write stdout")?;
            stdout.flush().context("flush stdout")
        }
    }
}

fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}

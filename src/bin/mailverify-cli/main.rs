mod args;
mod output;

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use mailverify_lib::{DnsLookup, EmailAddress, Verifier, resolve_mail_hosts};

use crate::args::{Cli, Commands};
use crate::output::{MxRow, Report, SyntaxRow, any_invalid, write_reports};

fn init_tracing() {
    // stdout carries the report; diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.verifier_config();

    if cli.stdin {
        let verifier = Verifier::system(config);
        let mut rows = Vec::new();
        for line in io::stdin().lock().lines() {
            let line = line.context("read stdin")?;
            let email = line.trim();
            if email.is_empty() {
                continue;
            }
            rows.push(verifier.verify(email));
        }
        return finish(&rows, &cli);
    }

    match &cli.cmd {
        Some(Commands::Verify { email }) => {
            let rows = vec![Verifier::system(config).verify(email)];
            finish(&rows, &cli)
        }
        Some(Commands::Validate { email }) => {
            let check = EmailAddress::parse(email).map(|_| ());
            finish(&[SyntaxRow::new(email, check)], &cli)
        }
        Some(Commands::Mx { domain }) => {
            let lookup = DnsLookup::new(config.lookup_timeout());
            let resolution = resolve_mail_hosts(&lookup, domain.trim());
            finish(&[MxRow::new(domain, &resolution)], &cli)
        }
        None => {
            Cli::clap_command().print_help()?;
            println!();
            Ok(())
        }
    }
}

// codes de sortie : 0 OK, 2 invalids, 1 fatal
fn finish<R: Report>(rows: &[R], cli: &Cli) -> Result<()> {
    write_reports(rows, cli)?;
    if any_invalid(rows) {
        std::process::exit(2);
    }
    Ok(())
}

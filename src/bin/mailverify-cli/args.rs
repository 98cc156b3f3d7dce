use clap::{Parser, Subcommand};
use mailverify_lib::{SmtpPort, VerifierConfig};

#[derive(Parser)]
#[command(name = "mailverify-cli", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// vérifie des adresses lues depuis stdin (une par ligne)
    #[arg(long)]
    pub stdin: bool,

    /// write report to file (JSON/NDJSON/CSV selon --format)
    #[arg(long)]
    pub out: Option<String>,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// timeout des requêtes DNS (ms)
    #[arg(long = "lookup-timeout-ms")]
    pub lookup_timeout_ms: Option<u64>,

    /// timeout de connexion TCP par port (ms)
    #[arg(long = "connect-timeout-ms")]
    pub connect_timeout_ms: Option<u64>,

    /// timeout de chaque lecture/écriture SMTP (ms)
    #[arg(long = "session-timeout-ms")]
    pub session_timeout_ms: Option<u64>,

    /// ports essayés dans l'ordre, suffixe `s` = TLS implicite (ex: 25,587,465s)
    #[arg(long, value_delimiter = ',')]
    pub ports: Vec<SmtpPort>,

    /// nombre maximum d'MX interrogés
    #[arg(long = "max-mx")]
    pub max_mx: Option<usize>,

    /// nom utilisé pour EHLO/HELO
    #[arg(long)]
    pub helo: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// syntaxe, MX, sonde SMTP et détection catch-all
    Verify { email: String },
    /// syntaxe seule, aucun accès réseau
    Validate { email: String },
    /// résout les hôtes de messagerie d'un domaine
    Mx { domain: String },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    /// Defaults overridden by whichever flags were given.
    pub fn verifier_config(&self) -> VerifierConfig {
        let mut config = VerifierConfig::default();
        if let Some(ms) = self.lookup_timeout_ms {
            config.lookup_timeout_ms = ms;
        }
        if let Some(ms) = self.connect_timeout_ms {
            config.probe.connect_timeout_ms = ms;
        }
        if let Some(ms) = self.session_timeout_ms {
            config.probe.session_timeout_ms = ms;
        }
        if !self.ports.is_empty() {
            config.probe.ports = self.ports.clone();
        }
        if let Some(max) = self.max_mx {
            config.max_mx_hosts = max;
        }
        if let Some(helo) = &self.helo {
            config.probe.helo_name = helo.clone();
        }
        config
    }
}

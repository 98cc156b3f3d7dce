//! The verification pipeline: syntax, mail hosts, SMTP probe, catch-all.
//!
//! Every stage may end the run with an `invalid` verdict; [`Verifier::verify`]
//! always returns a [`VerificationResult`] and never an error.

mod options;
mod types;

pub use options::VerifierConfig;
pub use types::{Stage, Status, VerificationResult};

use tracing::{debug, info};

use crate::mx::{DnsLookup, MailHostLookup, resolve_mail_hosts};
use crate::smtp_verify::{Prober, RetryPolicy, SmtpProber, is_catch_all};
use crate::validator::EmailAddress;

/// Verify `email` against live DNS and SMTP.
///
/// Builds a system resolver for the call; long-lived callers should keep a
/// [`Verifier`] from [`Verifier::system`] instead.
pub fn verify_email(email: &str, config: &VerifierConfig) -> VerificationResult {
    Verifier::system(config.clone()).verify(email)
}

/// Pipeline over an injected lookup and prober.
///
/// Holds no per-call state; share one instance across threads freely.
pub struct Verifier<L, P> {
    lookup: L,
    prober: P,
    config: VerifierConfig,
}

impl Verifier<DnsLookup, SmtpProber<DnsLookup>> {
    /// Verifier backed by the system resolver and live SMTP.
    pub fn system(config: VerifierConfig) -> Self {
        let lookup = DnsLookup::new(config.lookup_timeout());
        let prober = SmtpProber::new(lookup.clone(), config.probe.clone());
        Self::new(lookup, prober, config)
    }
}

impl<L, P> Verifier<L, P>
where
    L: MailHostLookup,
    P: Prober,
{
    pub fn new(lookup: L, prober: P, config: VerifierConfig) -> Self {
        Self {
            lookup,
            prober,
            config,
        }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn verify(&self, email: &str) -> VerificationResult {
        let result = self.run(email).finish();
        info!(
            email,
            status = %result.status(),
            stage = ?result.stopped_after(),
            detail = result.detail().unwrap_or(""),
            "verification finished"
        );
        result
    }

    fn run(&self, email: &str) -> VerificationResult {
        let mut result = VerificationResult::new(email);

        let address = match EmailAddress::parse(email) {
            Ok(address) => address,
            Err(err) => {
                debug!(email, error = %err, "syntax check failed");
                result.set_detail(err.to_string());
                return result;
            }
        };
        result.advance(Stage::SyntaxChecked);

        let domain = address.domain();
        let resolution = resolve_mail_hosts(&self.lookup, domain);
        let hosts = resolution.hosts();
        if hosts.is_empty() {
            if let Some(cause) = resolution.failure() {
                result.set_detail(cause.to_string());
            }
            debug!(domain, "no mail hosts");
            return result;
        }
        result.advance(Stage::DomainResolved);
        debug!(domain, has_mx = resolution.has_mx(), ?hosts, "mail hosts resolved");

        let target = address.to_string();
        let outcome = RetryPolicy::new(hosts.iter())
            .max_attempts(self.config.max_mx_hosts)
            .run(|host| self.prober.probe(host, &target));
        if !outcome.is_accepted() {
            if let Some(reason) = outcome.reason() {
                result.set_detail(reason.to_string());
            }
            debug!(email, %outcome, "no host accepted the recipient");
            return result;
        }
        result.advance(Stage::SmtpProbed);

        let catch_all = is_catch_all(&self.prober, domain, &hosts);
        debug!(domain, catch_all, "catch-all check done");
        result.set_catch_all(catch_all);
        result
    }
}

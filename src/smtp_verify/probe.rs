use std::io;
use std::net::{IpAddr, SocketAddr};

use tracing::debug;

use crate::mx::{LookupFailure, MailHostLookup};
use crate::smtp_verify::error::SessionError;
use crate::smtp_verify::options::{ProbeOptions, SmtpPort};
use crate::smtp_verify::retry::RetryPolicy;
use crate::smtp_verify::session::SmtpSession;
use crate::smtp_verify::types::{ACCEPT_CODES, FailureReason, ProbeOutcome};

/// Asks a mail host whether it would accept mail for an address.
pub trait Prober {
    fn probe(&self, host: &str, address: &str) -> ProbeOutcome;
}

impl<T: Prober + ?Sized> Prober for &T {
    fn probe(&self, host: &str, address: &str) -> ProbeOutcome {
        (**self).probe(host, address)
    }
}

/// Live SMTP prober.
///
/// Walks the configured ports in order and stops at the first port where
/// `RCPT TO` is accepted. Only greeting, `EHLO`/`HELO`, `MAIL FROM:<>`, one
/// `RCPT TO` and `QUIT` are ever sent.
#[derive(Clone)]
pub struct SmtpProber<L> {
    lookup: L,
    options: ProbeOptions,
}

impl<L: MailHostLookup> SmtpProber<L> {
    pub fn new(lookup: L, options: ProbeOptions) -> Self {
        Self { lookup, options }
    }

    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }

    fn resolve_host(&self, host: &str) -> Result<Vec<IpAddr>, LookupFailure> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }
        let addresses = self.lookup.lookup_addresses(host)?;
        if addresses.is_empty() {
            return Err(LookupFailure::NoRecords);
        }
        Ok(addresses)
    }

    fn probe_port(
        &self,
        host: &str,
        addresses: &[IpAddr],
        port: &SmtpPort,
        address: &str,
    ) -> ProbeOutcome {
        let targets: Vec<SocketAddr> = addresses
            .iter()
            .map(|ip| SocketAddr::new(*ip, port.port))
            .collect();
        let mut session = match SmtpSession::connect(
            host,
            &targets,
            port.tls,
            self.options.connect_timeout(),
            self.options.session_timeout(),
        ) {
            Ok(session) => session,
            Err(err) => return classify_session_error(port.port, &err).into_outcome(),
        };

        let outcome = self
            .converse(&mut session, port.port, address)
            .unwrap_or_else(|err| classify_session_error(port.port, &err).into_outcome());
        session.quit();
        outcome
    }

    fn converse(
        &self,
        session: &mut SmtpSession,
        port: u16,
        address: &str,
    ) -> Result<ProbeOutcome, SessionError> {
        let greeting = session.read_greeting()?;
        if !greeting.is_positive_completion() {
            return Ok(FailureReason::GreetingRefused {
                port,
                code: greeting.code,
                text: greeting.text(),
            }
            .into_outcome());
        }

        let helo_name = self.options.helo_name();
        let ehlo = session.send_command(&format!("EHLO {helo_name}"))?;
        if !ehlo.is_positive_completion() {
            let helo = session.send_command(&format!("HELO {helo_name}"))?;
            if !helo.is_positive_completion() {
                return Ok(FailureReason::HeloRefused {
                    port,
                    code: helo.code,
                    text: helo.text(),
                }
                .into_outcome());
            }
        }

        let mail = session.send_command("MAIL FROM:<>")?;
        if !mail.is_positive_completion() {
            return Ok(FailureReason::SenderRejected {
                port,
                code: mail.code,
                text: mail.text(),
            }
            .into_outcome());
        }

        let rcpt = session.send_command(&format!("RCPT TO:<{address}>"))?;
        if ACCEPT_CODES.contains(&rcpt.code) {
            return Ok(ProbeOutcome::Accepted { code: rcpt.code });
        }
        Ok(FailureReason::RecipientRejected {
            port,
            code: rcpt.code,
            text: rcpt.text(),
        }
        .into_outcome())
    }
}

impl<L: MailHostLookup> Prober for SmtpProber<L> {
    fn probe(&self, host: &str, address: &str) -> ProbeOutcome {
        let addresses = match self.resolve_host(host) {
            Ok(addresses) => addresses,
            Err(cause) => {
                // no port can succeed on a host without an address
                debug!(host, %cause, "host unresolved");
                return ProbeOutcome::TransientFailure(FailureReason::HostUnresolved {
                    host: host.to_string(),
                    cause,
                });
            }
        };

        RetryPolicy::new(self.options.ports.iter().copied()).run(|port| {
            let outcome = self.probe_port(host, &addresses, port, address);
            debug!(host, port = %port, %outcome, "probe attempt");
            outcome
        })
    }
}

/// Map a session failure onto the diagnostic taxonomy.
pub(crate) fn classify_session_error(port: u16, err: &SessionError) -> FailureReason {
    match err {
        SessionError::Connect { source, .. } => match source.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                FailureReason::ConnectTimeout { port }
            }
            io::ErrorKind::ConnectionRefused if port == 25 => FailureReason::Port25Blocked,
            io::ErrorKind::ConnectionRefused => FailureReason::ConnectionRefused { port },
            _ => FailureReason::Connect {
                port,
                message: source.to_string(),
            },
        },
        SessionError::Io { source } => match source.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                FailureReason::SessionTimeout { port }
            }
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => FailureReason::ServerDisconnected { port },
            _ => FailureReason::Io {
                port,
                message: source.to_string(),
            },
        },
        SessionError::Tls { source } => FailureReason::Tls {
            port,
            message: source.to_string(),
        },
        SessionError::Protocol(message) => FailureReason::MalformedReply {
            port,
            message: message.clone(),
        },
        SessionError::NoAddress => FailureReason::Connect {
            port,
            message: err.to_string(),
        },
    }
}

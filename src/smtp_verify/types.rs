use std::fmt;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::mx::LookupFailure;

/// Reply codes to `RCPT TO` that count as acceptance. 251 and 252 (forward,
/// cannot verify but will try) are treated like 250.
pub const ACCEPT_CODES: [u16; 3] = [250, 251, 252];

/// Why a probe attempt did not end in acceptance.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    HostUnresolved { host: String, cause: LookupFailure },
    ConnectTimeout { port: u16 },
    ConnectionRefused { port: u16 },
    /// Refused on port 25. Usually an outbound filter on the probing side
    /// (cloud providers block it by default) rather than the remote host.
    Port25Blocked,
    Connect { port: u16, message: String },
    Tls { port: u16, message: String },
    SessionTimeout { port: u16 },
    ServerDisconnected { port: u16 },
    Io { port: u16, message: String },
    MalformedReply { port: u16, message: String },
    GreetingRefused { port: u16, code: u16, text: String },
    /// Both EHLO and HELO were refused.
    HeloRefused { port: u16, code: u16, text: String },
    SenderRejected { port: u16, code: u16, text: String },
    RecipientRejected { port: u16, code: u16, text: String },
    /// Nothing to try: empty port or host list.
    NoCandidates,
}

impl FailureReason {
    /// The server answered and said no, as opposed to the transport failing.
    pub fn is_protocol_rejection(&self) -> bool {
        matches!(
            self,
            Self::GreetingRefused { .. }
                | Self::HeloRefused { .. }
                | Self::SenderRejected { .. }
                | Self::RecipientRejected { .. }
        )
    }

    pub fn into_outcome(self) -> ProbeOutcome {
        if self.is_protocol_rejection() {
            ProbeOutcome::Rejected(self)
        } else {
            ProbeOutcome::TransientFailure(self)
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostUnresolved { host, cause } => {
                write!(f, "could not resolve host {host}: {cause}")
            }
            Self::ConnectTimeout { port } => write!(f, "connection timeout on port {port}"),
            Self::ConnectionRefused { port } => write!(f, "connection refused on port {port}"),
            Self::Port25Blocked => f.write_str(
                "port 25 blocked (outbound port 25 is commonly filtered by the network provider)",
            ),
            Self::Connect { port, message } => {
                write!(f, "connection error on port {port}: {message}")
            }
            Self::Tls { port, message } => write!(f, "TLS error on port {port}: {message}"),
            Self::SessionTimeout { port } => write!(f, "session timeout on port {port}"),
            Self::ServerDisconnected { port } => write!(f, "server disconnected on port {port}"),
            Self::Io { port, message } => write!(f, "SMTP error on port {port}: {message}"),
            Self::MalformedReply { port, message } => {
                write!(f, "malformed reply on port {port}: {message}")
            }
            Self::GreetingRefused { code, text, .. } => write!(f, "greeting refused: {code} {text}"),
            Self::HeloRefused { code, text, .. } => write!(f, "EHLO/HELO refused: {code} {text}"),
            Self::SenderRejected { code, text, .. } => write!(f, "MAIL FROM failed: {code} {text}"),
            Self::RecipientRejected { code, text, .. } => write!(f, "rejected: {code} {text}"),
            Self::NoCandidates => f.write_str("all connection attempts failed"),
        }
    }
}

/// Result of asking one host about one address. Every attempt yields exactly
/// one of these.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Accepted { code: u16 },
    Rejected(FailureReason),
    TransientFailure(FailureReason),
}

impl ProbeOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            Self::Accepted { .. } => None,
            Self::Rejected(reason) | Self::TransientFailure(reason) => Some(reason),
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted { code } => write!(f, "accepted ({code})"),
            Self::Rejected(reason) => write!(f, "rejected: {reason}"),
            Self::TransientFailure(reason) => write!(f, "failed: {reason}"),
        }
    }
}

use std::net::SocketAddr;

use thiserror::Error;

/// Failure inside a single SMTP session. Never leaves the prober: it is
/// turned into a [`FailureReason`](super::FailureReason) at the port boundary.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
    #[error("TLS handshake failed: {source}")]
    Tls {
        #[source]
        source: native_tls::Error,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("no socket address to connect to")]
    NoAddress,
}

impl SessionError {
    pub(crate) fn connect(addr: SocketAddr, source: std::io::Error) -> Self {
        Self::Connect { addr, source }
    }

    pub(crate) fn io(source: std::io::Error) -> Self {
        Self::Io { source }
    }

    pub(crate) fn tls(source: native_tls::Error) -> Self {
        Self::Tls { source }
    }
}

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// How TLS is negotiated on a port.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Plain SMTP, no TLS.
    None,
    /// TLS from the first byte (SMTPS, port 465).
    Implicit,
}

#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmtpPort {
    pub port: u16,
    pub tls: TlsMode,
}

impl SmtpPort {
    pub const fn plain(port: u16) -> Self {
        Self {
            port,
            tls: TlsMode::None,
        }
    }

    pub const fn implicit_tls(port: u16) -> Self {
        Self {
            port,
            tls: TlsMode::Implicit,
        }
    }
}

/// Ports tried in order: relay, submission, submission over TLS.
pub const DEFAULT_PORTS: [SmtpPort; 3] = [
    SmtpPort::plain(25),
    SmtpPort::plain(587),
    SmtpPort::implicit_tls(465),
];

impl fmt::Display for SmtpPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tls {
            TlsMode::None => write!(f, "{}", self.port),
            TlsMode::Implicit => write!(f, "{}s", self.port),
        }
    }
}

/// Parses `25` (plain) or `465s` (implicit TLS).
impl FromStr for SmtpPort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (digits, tls) = match trimmed.strip_suffix('s') {
            Some(digits) => (digits, TlsMode::Implicit),
            None => (trimmed, TlsMode::None),
        };
        let port = digits
            .parse::<u16>()
            .map_err(|_| format!("invalid port '{trimmed}'"))?;
        if port == 0 {
            return Err("port 0 is not allowed".to_string());
        }
        Ok(Self { port, tls })
    }
}

/// Knobs for [`SmtpProber`](super::SmtpProber).
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub connect_timeout_ms: u64,
    pub session_timeout_ms: u64,
    pub ports: Vec<SmtpPort>,
    pub helo_name: String,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            session_timeout_ms: 10_000,
            ports: DEFAULT_PORTS.to_vec(),
            helo_name: "localhost".to_string(),
        }
    }
}

impl ProbeOptions {
    /// Sockets refuse a zero timeout, so every timeout is at least 1 ms.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms.max(1))
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(self.session_timeout_ms.max(1))
    }

    pub fn helo_name(&self) -> &str {
        let trimmed = self.helo_name.trim();
        if trimmed.is_empty() { "localhost" } else { trimmed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_port_specs() {
        assert_eq!("25".parse::<SmtpPort>(), Ok(SmtpPort::plain(25)));
        assert_eq!("465s".parse::<SmtpPort>(), Ok(SmtpPort::implicit_tls(465)));
        assert!("0".parse::<SmtpPort>().is_err());
        assert!("smtp".parse::<SmtpPort>().is_err());
        assert!("70000".parse::<SmtpPort>().is_err());
    }

    #[test]
    fn port_display_round_trips_tls_suffix() {
        let rendered: Vec<String> = DEFAULT_PORTS.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["25", "587", "465s"]);
    }

    #[test]
    fn zero_timeouts_are_clamped() {
        let options = ProbeOptions {
            connect_timeout_ms: 0,
            session_timeout_ms: 0,
            ..ProbeOptions::default()
        };
        assert_eq!(options.connect_timeout(), Duration::from_millis(1));
        assert_eq!(options.session_timeout(), Duration::from_millis(1));
    }

    #[test]
    fn blank_helo_falls_back_to_localhost() {
        let options = ProbeOptions {
            helo_name: "  ".to_string(),
            ..ProbeOptions::default()
        };
        assert_eq!(options.helo_name(), "localhost");
    }
}

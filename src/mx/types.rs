use std::fmt;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// Why a lookup produced no usable answer.
///
/// The verifier currently treats every variant as "no mail hosts"; the causes
/// stay separate so callers can tell a slow resolver from a missing domain.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// The name does not exist (NXDOMAIN).
    NxDomain,
    /// The name exists but has no record of the requested type.
    NoRecords,
    /// No nameserver gave a usable answer (SERVFAIL, REFUSED, unreachable).
    NoNameservers,
    Timeout,
    /// The resolver itself could not be built.
    ResolverUnavailable(String),
    Other(String),
}

impl LookupFailure {
    /// MX answers that send the resolver to the address-record fallback.
    pub fn is_no_mx_signal(&self) -> bool {
        matches!(self, Self::NxDomain | Self::NoRecords | Self::NoNameservers)
    }
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NxDomain => f.write_str("domain does not exist"),
            Self::NoRecords => f.write_str("no records found"),
            Self::NoNameservers => f.write_str("no nameserver answered"),
            Self::Timeout => f.write_str("DNS lookup timed out"),
            Self::ResolverUnavailable(reason) => write!(f, "resolver unavailable: {reason}"),
            Self::Other(reason) => write!(f, "DNS lookup failed: {reason}"),
        }
    }
}

/// Mail-exchange topology of a domain.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// MX records, ascending preference, ties in answer order.
    Mx(Vec<MxRecord>),
    /// No MX, but the domain has an address record and takes mail itself.
    Implicit(String),
    /// Neither MX nor address record could be obtained.
    Unresolvable(LookupFailure),
}

impl Resolution {
    pub fn has_mx(&self) -> bool {
        matches!(self, Self::Mx(records) if !records.is_empty())
    }

    /// Candidate hosts in the order they should be tried.
    pub fn hosts(&self) -> Vec<String> {
        match self {
            Self::Mx(records) => records.iter().map(|r| r.exchange.clone()).collect(),
            Self::Implicit(domain) => vec![domain.clone()],
            Self::Unresolvable(_) => Vec::new(),
        }
    }

    pub fn failure(&self) -> Option<&LookupFailure> {
        match self {
            Self::Unresolvable(cause) => Some(cause),
            _ => None,
        }
    }
}

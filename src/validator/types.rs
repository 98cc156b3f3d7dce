use std::fmt;

use thiserror::Error;

/// A syntactically valid address, split at the `@`.
///
/// Only [`EmailAddress::parse`](super::EmailAddress::parse) builds one, so a
/// value of this type always satisfies the accepted grammar.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress {
    pub(super) local: String,
    pub(super) domain: String,
}

impl EmailAddress {
    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local, self.domain)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("address is empty")]
    Empty,
    #[error("address does not match local@domain.tld")]
    Malformed,
}

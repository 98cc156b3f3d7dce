//! Mail-exchange resolution.
//!
//! [`resolve_mail_hosts`] turns a domain into the ordered list of hosts worth
//! probing, falling back to the domain's address record (implicit MX) when no
//! MX record exists. DNS access goes through [`MailHostLookup`].

mod error;
mod resolver;
mod types;

pub(crate) use error::MxError;
pub use resolver::{DnsLookup, MailHostLookup, resolve_mail_hosts};
pub use types::{LookupFailure, MxRecord, Resolution};

#[cfg(test)]
pub(crate) mod tests;

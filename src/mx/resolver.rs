use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use trust_dns_resolver::{
    Resolver,
    error::{ResolveError, ResolveErrorKind},
    proto::op::ResponseCode,
    system_conf::read_system_conf,
};

use super::{LookupFailure, MxError, MxRecord, Resolution};

/// DNS queries the verifier needs. Implemented by [`DnsLookup`] for real
/// traffic and by stubs in tests.
pub trait MailHostLookup {
    /// MX records of `domain`, in answer order.
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, LookupFailure>;

    /// A/AAAA records of `host`.
    fn lookup_addresses(&self, host: &str) -> Result<Vec<IpAddr>, LookupFailure>;
}

impl<T: MailHostLookup + ?Sized> MailHostLookup for &T {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, LookupFailure> {
        (**self).lookup_mx(domain)
    }

    fn lookup_addresses(&self, host: &str) -> Result<Vec<IpAddr>, LookupFailure> {
        (**self).lookup_addresses(host)
    }
}

/// System-configured resolver with a bounded per-query timeout.
///
/// Cheap to clone; clones share the underlying resolver. When the resolver
/// cannot be built every lookup reports
/// [`LookupFailure::ResolverUnavailable`] instead of failing construction.
#[derive(Clone)]
pub struct DnsLookup {
    resolver: Result<Arc<Resolver>, String>,
}

impl DnsLookup {
    pub fn new(timeout: Duration) -> Self {
        let resolver = build_resolver(timeout).map(Arc::new).map_err(|err| {
            warn!(error = %err, "DNS resolver unavailable");
            err.to_string()
        });
        Self { resolver }
    }

    fn resolver(&self) -> Result<&Resolver, LookupFailure> {
        self.resolver
            .as_deref()
            .map_err(|reason| LookupFailure::ResolverUnavailable(reason.clone()))
    }
}

fn build_resolver(timeout: Duration) -> Result<Resolver, MxError> {
    let (config, mut opts) = read_system_conf().map_err(MxError::system_conf)?;
    opts.timeout = timeout;
    opts.attempts = 1;
    Resolver::new(config, opts).map_err(MxError::resolver_init)
}

impl MailHostLookup for DnsLookup {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, LookupFailure> {
        let lookup = self
            .resolver()?
            .mx_lookup(domain)
            .map_err(|err| classify(&err))?;
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }

    fn lookup_addresses(&self, host: &str) -> Result<Vec<IpAddr>, LookupFailure> {
        let lookup = self
            .resolver()?
            .lookup_ip(host)
            .map_err(|err| classify(&err))?;
        Ok(lookup.iter().collect())
    }
}

pub(crate) fn classify(err: &ResolveError) -> LookupFailure {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
            ResponseCode::NXDomain => LookupFailure::NxDomain,
            ResponseCode::NoError => LookupFailure::NoRecords,
            _ => LookupFailure::NoNameservers,
        },
        ResolveErrorKind::NoConnections => LookupFailure::NoNameservers,
        ResolveErrorKind::Timeout => LookupFailure::Timeout,
        _ => LookupFailure::Other(err.to_string()),
    }
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

/// Resolve the hosts that accept mail for `domain`.
///
/// MX records win; without them the domain's own address record stands in as
/// a single implicit host. Lookup errors never escape: they end up in
/// [`Resolution::Unresolvable`].
pub fn resolve_mail_hosts<L>(lookup: &L, domain: &str) -> Resolution
where
    L: MailHostLookup + ?Sized,
{
    let mx_failure = match lookup.lookup_mx(domain) {
        Ok(mut records) if !records.is_empty() => {
            // stable: equal preferences keep answer order
            records.sort_by_key(|r| r.preference);
            debug!(domain, count = records.len(), "MX records resolved");
            return Resolution::Mx(records);
        }
        Ok(_) => LookupFailure::NoRecords,
        Err(failure) => failure,
    };

    if !mx_failure.is_no_mx_signal() {
        debug!(domain, cause = %mx_failure, "MX lookup failed");
        return Resolution::Unresolvable(mx_failure);
    }

    debug!(domain, cause = %mx_failure, "no MX, checking address record");
    match lookup.lookup_addresses(domain) {
        Ok(addresses) if !addresses.is_empty() => Resolution::Implicit(domain.to_string()),
        Ok(_) => Resolution::Unresolvable(mx_failure),
        Err(LookupFailure::NoRecords) => Resolution::Unresolvable(mx_failure),
        Err(failure) => Resolution::Unresolvable(failure),
    }
}

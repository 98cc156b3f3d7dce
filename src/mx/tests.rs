use std::cell::RefCell;
use std::net::{IpAddr, Ipv4Addr};

use super::{LookupFailure, MailHostLookup, MxRecord, Resolution, resolve_mail_hosts, resolver};

type MxResult = Result<Vec<MxRecord>, LookupFailure>;
type AddrResult = Result<Vec<IpAddr>, LookupFailure>;

pub(crate) struct StubResolver {
    pub on_mx: Box<dyn Fn(&str) -> MxResult>,
    pub on_addresses: Box<dyn Fn(&str) -> AddrResult>,
    pub calls: RefCell<Vec<String>>,
}

impl StubResolver {
    pub(crate) fn new<M, A>(on_mx: M, on_addresses: A) -> Self
    where
        M: Fn(&str) -> MxResult + 'static,
        A: Fn(&str) -> AddrResult + 'static,
    {
        Self {
            on_mx: Box::new(on_mx),
            on_addresses: Box::new(on_addresses),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl MailHostLookup for StubResolver {
    fn lookup_mx(&self, domain: &str) -> MxResult {
        self.calls.borrow_mut().push(format!("MX {domain}"));
        (self.on_mx)(domain)
    }

    fn lookup_addresses(&self, host: &str) -> AddrResult {
        self.calls.borrow_mut().push(format!("A {host}"));
        (self.on_addresses)(host)
    }
}

fn loopback() -> AddrResult {
    Ok(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
}

#[test]
fn mx_records_sorted_by_preference() {
    let stub = StubResolver::new(
        |domain| {
            assert_eq!(domain, "example.com");
            Ok(vec![
                MxRecord::new(20, "mx2.example.com"),
                MxRecord::new(10, "mx1.example.com"),
                MxRecord::new(30, "mx3.example.com"),
            ])
        },
        |_| panic!("no address lookup expected"),
    );

    let resolution = resolve_mail_hosts(&stub, "example.com");
    assert!(resolution.has_mx());
    assert_eq!(
        resolution.hosts(),
        vec!["mx1.example.com", "mx2.example.com", "mx3.example.com"]
    );
}

#[test]
fn equal_preferences_keep_answer_order_and_duplicates() {
    let stub = StubResolver::new(
        |_| {
            Ok(vec![
                MxRecord::new(10, "b.example.com"),
                MxRecord::new(5, "z.example.com"),
                MxRecord::new(10, "a.example.com"),
                MxRecord::new(10, "b.example.com"),
            ])
        },
        |_| loopback(),
    );

    let hosts = resolve_mail_hosts(&stub, "example.com").hosts();
    assert_eq!(
        hosts,
        vec![
            "z.example.com",
            "b.example.com",
            "a.example.com",
            "b.example.com"
        ]
    );
}

#[test]
fn missing_mx_falls_back_to_address_record() {
    for cause in [
        LookupFailure::NoRecords,
        LookupFailure::NxDomain,
        LookupFailure::NoNameservers,
    ] {
        let stub = StubResolver::new(move |_| Err(cause.clone()), |_| loopback());
        let resolution = resolve_mail_hosts(&stub, "example.com");
        assert_eq!(resolution, Resolution::Implicit("example.com".to_string()));
        assert!(!resolution.has_mx());
        assert_eq!(resolution.hosts(), vec!["example.com"]);
        assert_eq!(
            *stub.calls.borrow(),
            vec!["MX example.com", "A example.com"]
        );
    }
}

#[test]
fn empty_mx_answer_falls_back_to_address_record() {
    let stub = StubResolver::new(|_| Ok(Vec::new()), |_| loopback());
    let resolution = resolve_mail_hosts(&stub, "example.com");
    assert_eq!(resolution.hosts(), vec!["example.com"]);
}

#[test]
fn nonexistent_domain_has_no_hosts() {
    let stub = StubResolver::new(
        |_| Err(LookupFailure::NxDomain),
        |_| Err(LookupFailure::NxDomain),
    );
    let resolution = resolve_mail_hosts(&stub, "nonexistent-domain-xyz123.invalid");
    assert!(!resolution.has_mx());
    assert!(resolution.hosts().is_empty());
    assert_eq!(resolution.failure(), Some(&LookupFailure::NxDomain));
}

#[test]
fn address_without_records_keeps_mx_cause() {
    let stub = StubResolver::new(
        |_| Err(LookupFailure::NoRecords),
        |_| Err(LookupFailure::NoRecords),
    );
    let resolution = resolve_mail_hosts(&stub, "example.com");
    assert_eq!(
        resolution,
        Resolution::Unresolvable(LookupFailure::NoRecords)
    );
}

#[test]
fn timeout_skips_address_fallback() {
    let stub = StubResolver::new(
        |_| Err(LookupFailure::Timeout),
        |_| panic!("timeout must not trigger the address fallback"),
    );
    let resolution = resolve_mail_hosts(&stub, "example.com");
    assert_eq!(resolution, Resolution::Unresolvable(LookupFailure::Timeout));
    assert!(resolution.hosts().is_empty());
}

#[test]
fn fallback_timeout_is_reported() {
    let stub = StubResolver::new(
        |_| Err(LookupFailure::NoRecords),
        |_| Err(LookupFailure::Timeout),
    );
    let resolution = resolve_mail_hosts(&stub, "example.com");
    assert_eq!(resolution.failure(), Some(&LookupFailure::Timeout));
}

#[test]
fn other_failures_are_unresolvable() {
    let stub = StubResolver::new(
        |_| Err(LookupFailure::Other("proto error".to_string())),
        |_| loopback(),
    );
    let resolution = resolve_mail_hosts(&stub, "example.com");
    assert!(resolution.hosts().is_empty());
    assert_eq!(stub.calls.borrow().len(), 1);
}

#[test]
fn normalize_exchange_trims_dot_and_lowercases() {
    let out = resolver::normalize_exchange("Mail.EXAMPLE.com.".to_string());
    assert_eq!(out, "mail.example.com");
}

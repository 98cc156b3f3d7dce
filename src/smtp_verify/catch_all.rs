use tracing::debug;

use crate::smtp_verify::probe::Prober;
use crate::smtp_verify::util::{CATCH_ALL_LOCAL_LEN, random_local_part};

/// Does the preferred host of `domain` accept a mailbox that cannot exist?
///
/// Probes a random address against `hosts[0]` only. An empty host list is
/// never a catch-all. Costs one extra live probe.
pub fn is_catch_all<P>(prober: &P, domain: &str, hosts: &[String]) -> bool
where
    P: Prober + ?Sized,
{
    let Some(host) = hosts.first() else {
        return false;
    };
    let synthetic = format!("{}@{domain}", random_local_part(CATCH_ALL_LOCAL_LEN));
    let outcome = prober.probe(host, &synthetic);
    debug!(host = %host, address = %synthetic, %outcome, "catch-all probe");
    outcome.is_accepted()
}

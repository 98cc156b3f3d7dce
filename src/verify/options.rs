use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::smtp_verify::ProbeOptions;

/// Everything the verifier needs, passed explicitly to its entry point.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    pub lookup_timeout_ms: u64,
    /// MX hosts probed for the real address, most preferred first.
    pub max_mx_hosts: usize,
    #[cfg_attr(feature = "with-serde", serde(flatten))]
    pub probe: ProbeOptions,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: 5_000,
            max_mx_hosts: 3,
            probe: ProbeOptions::default(),
        }
    }
}

impl VerifierConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms.max(1))
    }
}

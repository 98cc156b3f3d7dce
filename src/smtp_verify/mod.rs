//! SMTP mailbox probing.
//!
//! [`SmtpProber`] runs a minimal SMTP dialogue (greeting, `EHLO`/`HELO`,
//! `MAIL FROM:<>`, `RCPT TO`) against one host, falling back across the
//! configured ports, and classifies the answer into a [`ProbeOutcome`].
//! [`is_catch_all`] reuses a prober with a random mailbox.

mod catch_all;
mod error;
mod options;
mod probe;
mod retry;
mod session;
mod types;
mod util;

pub use catch_all::is_catch_all;
pub use error::SessionError;
pub use options::{DEFAULT_PORTS, ProbeOptions, SmtpPort, TlsMode};
pub use probe::{Prober, SmtpProber};
pub use retry::RetryPolicy;
pub use types::{ACCEPT_CODES, FailureReason, ProbeOutcome};
pub use util::{CATCH_ALL_LOCAL_LEN, random_local_part};

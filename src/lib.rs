#![forbid(unsafe_code)]
//! mailverify_lib : vérification de délivrabilité d'adresses e-mail.
//!
//! Pipeline: syntaxe, résolution MX (avec repli sur l'enregistrement A),
//! sonde SMTP `RCPT TO` sans envoi de message, détection catch-all.

pub mod mx;
pub mod smtp_verify;
pub mod validator;
pub mod verify;

pub use mx::{DnsLookup, LookupFailure, MailHostLookup, MxRecord, Resolution, resolve_mail_hosts};
pub use smtp_verify::{
    FailureReason, ProbeOptions, ProbeOutcome, Prober, RetryPolicy, SmtpPort, SmtpProber, TlsMode,
    is_catch_all,
};
pub use validator::{EmailAddress, SyntaxError, is_valid_syntax};
pub use verify::{Stage, Status, VerificationResult, Verifier, VerifierConfig, verify_email};

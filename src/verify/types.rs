use std::fmt;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// Final verdict.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Invalid,
    Valid,
    /// The server accepts everything, so acceptance says little.
    Risky,
}

impl Status {
    /// The verdict is fully determined by the four pipeline flags.
    pub fn from_flags(syntax: bool, mx: bool, smtp_accepts: bool, catch_all: bool) -> Self {
        if !(syntax && mx && smtp_accepts) {
            Self::Invalid
        } else if catch_all {
            Self::Risky
        } else {
            Self::Valid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Valid => "valid",
            Self::Risky => "risky",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stages, in the only order they can be reached. Any failure ends
/// the run where it stands; [`VerificationResult::stopped_after`] reports the
/// last stage that completed.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Stage {
    #[default]
    Start,
    SyntaxChecked,
    DomainResolved,
    SmtpProbed,
    CatchAllChecked,
}

/// Outcome of one verification.
///
/// Serializes to `{email, syntax, mx, smtp_accepts, catch_all, status}`.
/// Flags past the point where the pipeline stopped stay `false`.
#[cfg_attr(feature = "with-serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    email: String,
    syntax: bool,
    mx: bool,
    smtp_accepts: bool,
    catch_all: bool,
    status: Status,
    #[cfg_attr(feature = "with-serde", serde(skip))]
    stopped_after: Stage,
    #[cfg_attr(feature = "with-serde", serde(skip))]
    detail: Option<String>,
}

impl VerificationResult {
    pub(crate) fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            syntax: false,
            mx: false,
            smtp_accepts: false,
            catch_all: false,
            status: Status::Invalid,
            stopped_after: Stage::Start,
            detail: None,
        }
    }

    pub(crate) fn advance(&mut self, stage: Stage) {
        debug_assert!(stage > self.stopped_after, "stages only move forward");
        match stage {
            Stage::SyntaxChecked => self.syntax = true,
            Stage::DomainResolved => self.mx = true,
            Stage::SmtpProbed => self.smtp_accepts = true,
            Stage::Start | Stage::CatchAllChecked => {}
        }
        self.stopped_after = stage;
    }

    pub(crate) fn set_catch_all(&mut self, catch_all: bool) {
        self.catch_all = catch_all;
        self.advance(Stage::CatchAllChecked);
    }

    pub(crate) fn set_detail(&mut self, detail: impl Into<String>) {
        self.detail = Some(detail.into());
    }

    /// Seal the result; the status is derived here and nowhere else.
    pub(crate) fn finish(mut self) -> Self {
        self.status = Status::from_flags(self.syntax, self.mx, self.smtp_accepts, self.catch_all);
        self
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn syntax(&self) -> bool {
        self.syntax
    }

    pub fn mx(&self) -> bool {
        self.mx
    }

    pub fn smtp_accepts(&self) -> bool {
        self.smtp_accepts
    }

    pub fn catch_all(&self) -> bool {
        self.catch_all
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Last stage completed before the pipeline ended.
    pub fn stopped_after(&self) -> Stage {
        self.stopped_after
    }

    /// Operator-facing reason for the last failure (resolver or probe), if any.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

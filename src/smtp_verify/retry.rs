use crate::smtp_verify::types::{FailureReason, ProbeOutcome};

/// Ordered fallback over candidates (ports, hosts).
///
/// Candidates are tried one after the other, up to `max_attempts`. The first
/// outcome matching the stop condition ends the run; otherwise the last
/// outcome seen is returned. An empty run yields
/// `TransientFailure(NoCandidates)`.
#[derive(Debug, Clone)]
pub struct RetryPolicy<C> {
    candidates: Vec<C>,
    max_attempts: usize,
    stop_when: fn(&ProbeOutcome) -> bool,
}

impl<C> RetryPolicy<C> {
    /// Try every candidate, stop on acceptance.
    pub fn new(candidates: impl IntoIterator<Item = C>) -> Self {
        Self {
            candidates: candidates.into_iter().collect(),
            max_attempts: usize::MAX,
            stop_when: ProbeOutcome::is_accepted,
        }
    }

    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn stop_when(mut self, stop_when: fn(&ProbeOutcome) -> bool) -> Self {
        self.stop_when = stop_when;
        self
    }

    /// Candidates that [`run`](Self::run) will visit, in order.
    pub fn candidates(&self) -> impl Iterator<Item = &C> {
        self.candidates.iter().take(self.max_attempts)
    }

    pub fn run<F>(&self, mut attempt: F) -> ProbeOutcome
    where
        F: FnMut(&C) -> ProbeOutcome,
    {
        let mut last = None;
        for candidate in self.candidates() {
            let outcome = attempt(candidate);
            if (self.stop_when)(&outcome) {
                return outcome;
            }
            last = Some(outcome);
        }
        last.unwrap_or(ProbeOutcome::TransientFailure(FailureReason::NoCandidates))
    }
}

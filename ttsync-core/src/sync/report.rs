use std::fmt;

use crate::diff::{DiffCounts, DiffKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Applied,
    /// Decided but not sent (dry run).
    DryRun,
    Skipped(String),
    Failed(String),
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Applied => write!(f, "applied"),
            OutcomeStatus::DryRun => write!(f, "dry-run"),
            OutcomeStatus::Skipped(reason) => write!(f, "skipped: {}", reason),
            OutcomeStatus::Failed(error) => write!(f, "failed: {}", error),
        }
    }
}

/// Result of one attempted remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// The call made (an update of a dead series is a delete).
    pub action: DiffKind,
    pub series: String,
    pub remote_id: Option<String>,
    pub status: OutcomeStatus,
}

impl SyncOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed(_))
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.action, self.series, self.status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    pub fn push(&mut self, outcome: SyncOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn extend(&mut self, other: SyncReport) {
        self.outcomes.extend(other.outcomes);
    }

    /// Calls that went through, or would have in a dry run.
    pub fn counts(&self) -> DiffCounts {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Applied | OutcomeStatus::DryRun))
            .map(|o| o.action)
            .collect()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Skipped(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

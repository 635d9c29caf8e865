//! Per-provider sync outcome reporting
//!
//! Every orchestrator entry point returns a [`SyncReport`]: one
//! [`ProviderOutcome`] per link slot that was considered, whether the call
//! succeeded, failed, or was skipped. Provider failures live here and only
//! here; they never propagate to the caller of the primary mutation.

use serde::{Deserialize, Serialize};

use super::commitment::ExternalLink;
use super::credential::{IntegrationFamily, Provider};
use crate::errors::SyncFailure;

/// Lifecycle event that triggered a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    Created,
    Completed,
    Deleted,
}

/// Why a link slot was skipped without any provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No usable credential for the profile.
    NotConnected,
    /// The link is already populated; create is never repeated.
    AlreadyLinked,
    /// The commitment has no deadline to schedule against.
    NoDeadline,
    /// The (task type, family) pair is ineligible by policy.
    PolicyExcluded,
    /// Calendar sync is withheld until the assignee is confirmed upstream.
    UnconfirmedAssignee,
    /// The link slot holds no external id to act on.
    NotLinked,
    /// The scheduled window already passed; the event stays as a record.
    PastEvent,
}

/// Outcome of one link slot in a sync pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SyncOutcome {
    Created { external_id: String },
    Completed,
    Deleted,
    Skipped { reason: SkipReason },
    Failed { error: SyncFailure },
}

impl SyncOutcome {
    /// Whether this outcome represents a completed provider call.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Created { .. } | Self::Completed | Self::Deleted)
    }

    /// Whether this outcome represents a failed provider call.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome for a single (link slot, provider) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderOutcome {
    pub link: ExternalLink,
    pub provider: Provider,
    pub family: IntegrationFamily,
    pub outcome: SyncOutcome,
}

/// Structured result of one orchestrator pass over a commitment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub commitment_id: String,
    pub event: LifecycleEvent,
    pub outcomes: Vec<ProviderOutcome>,
}

impl SyncReport {
    /// Create an empty report for the given commitment and event.
    #[must_use]
    pub fn new(commitment_id: impl Into<String>, event: LifecycleEvent) -> Self {
        Self { commitment_id: commitment_id.into(), event, outcomes: Vec::new() }
    }

    /// Record an outcome for a link slot.
    pub fn record(
        &mut self,
        link: ExternalLink,
        provider: Provider,
        family: IntegrationFamily,
        outcome: SyncOutcome,
    ) {
        self.outcomes.push(ProviderOutcome { link, provider, family, outcome });
    }

    /// Number of completed provider calls.
    #[must_use]
    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_success()).count()
    }

    /// Number of failed provider calls.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_failure()).count()
    }

    /// Outcome recorded for a link slot, if any.
    #[must_use]
    pub fn outcome_for(&self, link: ExternalLink) -> Option<&SyncOutcome> {
        self.outcomes.iter().find(|o| o.link == link).map(|o| &o.outcome)
    }
}

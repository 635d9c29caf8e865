//! Synchronization orchestrator
//!
//! Propagates commitment lifecycle events to every linked provider.
//! Transitions are fire-and-record: outbound calls fan out concurrently,
//! every outcome lands in the returned [`SyncReport`], and no provider
//! failure ever reaches the caller of the primary mutation.
//!
//! Provider calls run in spawned tasks, so dropping the owning request
//! does not cancel an in-flight call and leave external state half
//! applied; an abandoned result is simply discarded. Each call carries an
//! independent timeout that resolves to `Unavailable`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cadence_domain::{
    Commitment, ExternalLink, IntegrationFamily, LifecycleEvent, Provider, SkipReason,
    SyncFailure, SyncOutcome, SyncReport, SyncResult,
};
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::policy::SyncPolicy;
use super::ports::{CommitmentStore, TaskAdapter};

const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);

/// One registered (link slot, provider) pair.
#[derive(Clone)]
struct SyncTarget {
    link: ExternalLink,
    family: IntegrationFamily,
    provider: Provider,
    adapter: Arc<dyn TaskAdapter>,
}

/// What to do with the link column once a settled call succeeds.
#[derive(Clone, Copy, PartialEq, Eq)]
enum SettledAction {
    /// `delete` succeeded (or resource was already gone): clear the link.
    ClearLink,
    /// `complete` succeeded: the resource still exists, keep the link.
    RetainLink,
}

/// Synchronization orchestrator over the registered provider targets.
pub struct SyncOrchestrator {
    targets: Vec<SyncTarget>,
    commitments: Arc<dyn CommitmentStore>,
    policy: SyncPolicy,
    provider_timeout: Duration,
}

impl SyncOrchestrator {
    /// Create an orchestrator with no registered targets.
    #[must_use]
    pub fn new(commitments: Arc<dyn CommitmentStore>) -> Self {
        Self {
            targets: Vec::new(),
            commitments,
            policy: SyncPolicy::default(),
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Register a calendar adapter for the `calendar_event_id` slot.
    ///
    /// May be called more than once; the first connected calendar provider
    /// serves the slot for any given profile.
    #[must_use]
    pub fn with_calendar(mut self, provider: Provider, adapter: Arc<dyn TaskAdapter>) -> Self {
        self.targets.push(SyncTarget {
            link: ExternalLink::CalendarEvent,
            family: IntegrationFamily::Calendar,
            provider,
            adapter,
        });
        self
    }

    /// Register the Microsoft To Do adapter for the `microsoft_task_id` slot.
    #[must_use]
    pub fn with_microsoft_tasks(mut self, adapter: Arc<dyn TaskAdapter>) -> Self {
        self.targets.push(SyncTarget {
            link: ExternalLink::MicrosoftTask,
            family: IntegrationFamily::Task,
            provider: Provider::Microsoft,
            adapter,
        });
        self
    }

    /// Register the Jira adapter for the `jira_task_id` slot.
    #[must_use]
    pub fn with_jira(mut self, adapter: Arc<dyn TaskAdapter>) -> Self {
        self.targets.push(SyncTarget {
            link: ExternalLink::JiraIssue,
            family: IntegrationFamily::Task,
            provider: Provider::Jira,
            adapter,
        });
        self
    }

    /// Override the eligibility/scheduling policy.
    #[must_use]
    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the per-call provider timeout.
    #[must_use]
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Scheduling policy in effect.
    #[must_use]
    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    /// Propagate a newly created commitment to every eligible provider.
    ///
    /// `assignee_confirmed` arrives from the upstream confirmation gate;
    /// calendar targets are withheld until it is true. A link slot that is
    /// already populated is skipped unconditionally, which is the sole
    /// duplicate-prevention mechanism across retries and re-processing.
    pub async fn on_task_created(
        &self,
        commitment: &Commitment,
        assignee_confirmed: bool,
    ) -> SyncReport {
        let mut report = SyncReport::new(&commitment.id, LifecycleEvent::Created);
        let mut pending: Vec<(SyncTarget, JoinHandle<SyncResult<String>>)> = Vec::new();
        let mut calendar_settled = false;

        for target in &self.targets {
            let is_calendar_slot = target.link == ExternalLink::CalendarEvent;
            if is_calendar_slot && calendar_settled {
                continue;
            }

            // Idempotency gate first: a populated link means zero further
            // provider calls for this slot, ever.
            if commitment.is_linked(target.link) {
                report.record(
                    target.link,
                    target.provider,
                    target.family,
                    SyncOutcome::Skipped { reason: SkipReason::AlreadyLinked },
                );
                calendar_settled |= is_calendar_slot;
                continue;
            }

            if !self.policy.allows(commitment.task_type, target.family) {
                report.record(
                    target.link,
                    target.provider,
                    target.family,
                    SyncOutcome::Skipped { reason: SkipReason::PolicyExcluded },
                );
                calendar_settled |= is_calendar_slot;
                continue;
            }

            if commitment.deadline.is_none() {
                report.record(
                    target.link,
                    target.provider,
                    target.family,
                    SyncOutcome::Skipped { reason: SkipReason::NoDeadline },
                );
                calendar_settled |= is_calendar_slot;
                continue;
            }

            if target.family == IntegrationFamily::Calendar && !assignee_confirmed {
                report.record(
                    target.link,
                    target.provider,
                    target.family,
                    SyncOutcome::Skipped { reason: SkipReason::UnconfirmedAssignee },
                );
                calendar_settled |= is_calendar_slot;
                continue;
            }

            // Connection is probed last so slot-level skips never touch the
            // credential store. An unconnected calendar target falls through
            // to the next registered calendar provider.
            if !target.adapter.is_connected(&commitment.profile_id).await {
                report.record(
                    target.link,
                    target.provider,
                    target.family,
                    SyncOutcome::Skipped { reason: SkipReason::NotConnected },
                );
                continue;
            }

            calendar_settled |= is_calendar_slot;

            let adapter = target.adapter.clone();
            let task = commitment.clone();
            pending.push((
                target.clone(),
                self.spawn_bounded(async move { adapter.create(&task).await }),
            ));
        }

        let mut link_writes: Vec<(ExternalLink, String)> = Vec::new();

        for (target, handle) in pending {
            let outcome = match Self::join(handle).await {
                Ok(external_id) => {
                    link_writes.push((target.link, external_id.clone()));
                    SyncOutcome::Created { external_id }
                }
                Err(failure) => {
                    warn!(
                        commitment_id = %commitment.id,
                        provider = target.provider.as_str(),
                        error = %failure,
                        "external create failed; link left empty"
                    );
                    SyncOutcome::Failed { error: failure }
                }
            };
            report.record(target.link, target.provider, target.family, outcome);
        }

        // The commitment row is written once, after every call settles.
        for (link, external_id) in link_writes {
            if let Err(e) =
                self.commitments.set_external_id(&commitment.id, link, &external_id).await
            {
                error!(
                    commitment_id = %commitment.id,
                    column = link.column(),
                    error = %e,
                    "failed to record external link"
                );
            }
        }

        report
    }

    /// Propagate a completion (status -> completed) to linked providers.
    ///
    /// The calendar link is deleted only while its scheduled window is
    /// still in the future; a past event stays as a historical record.
    /// Task-list and issue-tracker links are completed in place and
    /// retained.
    pub async fn on_task_completed(
        &self,
        commitment: &Commitment,
        note: Option<&str>,
    ) -> SyncReport {
        let mut report = SyncReport::new(&commitment.id, LifecycleEvent::Completed);
        let mut pending: Vec<(SyncTarget, SettledAction, JoinHandle<SyncResult<()>>)> = Vec::new();
        let now = Utc::now();
        let mut calendar_settled = false;

        for target in &self.targets {
            let is_calendar_slot = target.link == ExternalLink::CalendarEvent;
            if is_calendar_slot && calendar_settled {
                continue;
            }

            let Some(external_id) = commitment.external_id(target.link) else {
                report.record(
                    target.link,
                    target.provider,
                    target.family,
                    SyncOutcome::Skipped { reason: SkipReason::NotLinked },
                );
                calendar_settled |= is_calendar_slot;
                continue;
            };

            if !target.adapter.is_connected(&commitment.profile_id).await {
                report.record(
                    target.link,
                    target.provider,
                    target.family,
                    SyncOutcome::Skipped { reason: SkipReason::NotConnected },
                );
                continue;
            }

            calendar_settled |= is_calendar_slot;

            if is_calendar_slot {
                // Re-derive the window the create pass scheduled; the
                // mapping is deterministic over (deadline, priority).
                let still_upcoming = commitment.deadline.is_some_and(|deadline| {
                    self.policy.scheduled_window(deadline, commitment.priority).0 > now
                });

                if !still_upcoming {
                    debug!(
                        commitment_id = %commitment.id,
                        "scheduled window already passed; calendar event kept as record"
                    );
                    report.record(
                        target.link,
                        target.provider,
                        target.family,
                        SyncOutcome::Skipped { reason: SkipReason::PastEvent },
                    );
                    continue;
                }

                let adapter = target.adapter.clone();
                let profile_id = commitment.profile_id.clone();
                let external_id = external_id.to_string();
                pending.push((
                    target.clone(),
                    SettledAction::ClearLink,
                    self.spawn_bounded(async move {
                        adapter.delete(&profile_id, &external_id).await
                    }),
                ));
            } else {
                let adapter = target.adapter.clone();
                let profile_id = commitment.profile_id.clone();
                let external_id = external_id.to_string();
                let note = note.map(String::from);
                pending.push((
                    target.clone(),
                    SettledAction::RetainLink,
                    self.spawn_bounded(async move {
                        adapter.complete(&profile_id, &external_id, note.as_deref()).await
                    }),
                ));
            }
        }

        let mut link_clears: Vec<ExternalLink> = Vec::new();

        for (target, action, handle) in pending {
            let result = Self::join(handle).await;
            let outcome = match result {
                // A resource that is already gone counts as done.
                Ok(()) | Err(SyncFailure::NotFound) => {
                    if action == SettledAction::ClearLink {
                        link_clears.push(target.link);
                        SyncOutcome::Deleted
                    } else {
                        SyncOutcome::Completed
                    }
                }
                Err(failure) => {
                    warn!(
                        commitment_id = %commitment.id,
                        provider = target.provider.as_str(),
                        error = %failure,
                        "external completion call failed"
                    );
                    SyncOutcome::Failed { error: failure }
                }
            };
            report.record(target.link, target.provider, target.family, outcome);
        }

        self.clear_links(&commitment.id, link_clears).await;

        report
    }

    /// Propagate a record deletion: best-effort delete of every populated
    /// link, concurrently and independently.
    ///
    /// None of the calls gates the others, and none gates the underlying
    /// record deletion, which the caller always performs.
    pub async fn on_task_deleted(&self, commitment: &Commitment) -> SyncReport {
        let mut report = SyncReport::new(&commitment.id, LifecycleEvent::Deleted);
        let mut pending: Vec<(SyncTarget, JoinHandle<SyncResult<()>>)> = Vec::new();
        let mut calendar_settled = false;

        for target in &self.targets {
            let is_calendar_slot = target.link == ExternalLink::CalendarEvent;
            if is_calendar_slot && calendar_settled {
                continue;
            }

            let Some(external_id) = commitment.external_id(target.link) else {
                report.record(
                    target.link,
                    target.provider,
                    target.family,
                    SyncOutcome::Skipped { reason: SkipReason::NotLinked },
                );
                calendar_settled |= is_calendar_slot;
                continue;
            };

            if !target.adapter.is_connected(&commitment.profile_id).await {
                report.record(
                    target.link,
                    target.provider,
                    target.family,
                    SyncOutcome::Skipped { reason: SkipReason::NotConnected },
                );
                continue;
            }

            calendar_settled |= is_calendar_slot;

            let adapter = target.adapter.clone();
            let profile_id = commitment.profile_id.clone();
            let external_id = external_id.to_string();
            pending.push((
                target.clone(),
                self.spawn_bounded(async move {
                    adapter.delete(&profile_id, &external_id).await
                }),
            ));
        }

        let mut link_clears: Vec<ExternalLink> = Vec::new();

        for (target, handle) in pending {
            let outcome = match Self::join(handle).await {
                Ok(()) | Err(SyncFailure::NotFound) => {
                    link_clears.push(target.link);
                    SyncOutcome::Deleted
                }
                Err(failure) => {
                    warn!(
                        commitment_id = %commitment.id,
                        provider = target.provider.as_str(),
                        error = %failure,
                        "external delete failed"
                    );
                    SyncOutcome::Failed { error: failure }
                }
            };
            report.record(target.link, target.provider, target.family, outcome);
        }

        self.clear_links(&commitment.id, link_clears).await;

        report
    }

    /// Clear link columns once, after all provider calls have settled.
    async fn clear_links(&self, commitment_id: &str, links: Vec<ExternalLink>) {
        for link in links {
            if let Err(e) = self.commitments.clear_external_id(commitment_id, link).await {
                // The caller may have already removed the record; a failed
                // clear is logged, never surfaced.
                debug!(
                    commitment_id,
                    column = link.column(),
                    error = %e,
                    "failed to clear external link"
                );
            }
        }
    }

    /// Run a provider call in its own task with a bounded timeout.
    ///
    /// Spawning detaches the call from the caller's lifetime; a timeout
    /// resolves to `Unavailable`.
    fn spawn_bounded<T>(
        &self,
        call: impl Future<Output = SyncResult<T>> + Send + 'static,
    ) -> JoinHandle<SyncResult<T>>
    where
        T: Send + 'static,
    {
        let timeout = self.provider_timeout;
        tokio::spawn(async move {
            match tokio::time::timeout(timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(SyncFailure::Unavailable(format!(
                    "provider call timed out after {}s",
                    timeout.as_secs()
                ))),
            }
        })
    }

    async fn join<T>(handle: JoinHandle<SyncResult<T>>) -> SyncResult<T> {
        match handle.await {
            Ok(result) => result,
            Err(e) => Err(SyncFailure::Unavailable(format!("provider task aborted: {e}"))),
        }
    }
}

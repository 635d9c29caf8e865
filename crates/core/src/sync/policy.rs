//! Table-driven sync eligibility and calendar scheduling
//!
//! Sync rules are data, not inline branches: one row per
//! (task type, family) pair says whether that pair syncs at all, and the
//! scheduling table maps a deadline onto the provider-facing event window.

use cadence_domain::{IntegrationFamily, Priority, TaskType};
use chrono::{DateTime, Duration, Timelike, Utc};

/// One eligibility rule row.
#[derive(Debug, Clone, Copy)]
struct EligibilityRule {
    task_type: TaskType,
    family: IntegrationFamily,
    eligible: bool,
}

/// Eligibility table: risks never leave the primary store; every other
/// task type syncs to both families.
const ELIGIBILITY: &[EligibilityRule] = &[
    EligibilityRule {
        task_type: TaskType::Commitment,
        family: IntegrationFamily::Calendar,
        eligible: true,
    },
    EligibilityRule {
        task_type: TaskType::Commitment,
        family: IntegrationFamily::Task,
        eligible: true,
    },
    EligibilityRule {
        task_type: TaskType::Action,
        family: IntegrationFamily::Calendar,
        eligible: true,
    },
    EligibilityRule { task_type: TaskType::Action, family: IntegrationFamily::Task, eligible: true },
    EligibilityRule {
        task_type: TaskType::FollowUp,
        family: IntegrationFamily::Calendar,
        eligible: true,
    },
    EligibilityRule {
        task_type: TaskType::FollowUp,
        family: IntegrationFamily::Task,
        eligible: true,
    },
    EligibilityRule {
        task_type: TaskType::Risk,
        family: IntegrationFamily::Calendar,
        eligible: false,
    },
    EligibilityRule { task_type: TaskType::Risk, family: IntegrationFamily::Task, eligible: false },
];

const EVENT_DURATION_MINUTES: i64 = 60;

/// Sync eligibility policy plus the deadline-to-window mapping.
#[derive(Debug, Clone, Copy)]
pub struct SyncPolicy {
    /// Anchor hour (UTC) for urgent work.
    morning_anchor_hour: u32,
    /// Anchor hour (UTC) for everything else.
    afternoon_anchor_hour: u32,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self { morning_anchor_hour: 9, afternoon_anchor_hour: 14 }
    }
}

impl SyncPolicy {
    /// Whether this (task type, family) pair syncs at all.
    #[must_use]
    pub fn allows(&self, task_type: TaskType, family: IntegrationFamily) -> bool {
        ELIGIBILITY
            .iter()
            .find(|rule| rule.task_type == task_type && rule.family == family)
            .is_some_and(|rule| rule.eligible)
    }

    /// Map a deadline onto a one-hour calendar window.
    ///
    /// Urgent tasks anchor to the morning slot on the deadline's day,
    /// everything else to the afternoon slot. The mapping is deterministic
    /// so completion-time checks can re-derive the window from the record.
    #[must_use]
    pub fn scheduled_window(
        &self,
        deadline: DateTime<Utc>,
        priority: Priority,
    ) -> (DateTime<Utc>, DateTime<Utc>) {
        let anchor_hour = if priority.is_urgent() {
            self.morning_anchor_hour
        } else {
            self.afternoon_anchor_hour
        };

        let start = deadline
            .with_hour(anchor_hour)
            .and_then(|dt| dt.with_minute(0))
            .and_then(|dt| dt.with_second(0))
            .and_then(|dt| dt.with_nanosecond(0))
            .unwrap_or(deadline);

        (start, start + Duration::minutes(EVENT_DURATION_MINUTES))
    }
}

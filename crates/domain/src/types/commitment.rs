//! Commitment record types
//!
//! A commitment is the internal task record produced by the extraction
//! pipeline or manual entry. The three nullable external-id columns form the
//! link registry: a populated column IS the link to the external resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentStatus {
    Pending,
    Completed,
}

impl CommitmentStatus {
    /// Database column representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Parse the database column representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Classification assigned by the extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    Commitment,
    Action,
    FollowUp,
    Risk,
}

impl TaskType {
    /// Database column representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Commitment => "commitment",
            Self::Action => "action",
            Self::FollowUp => "follow-up",
            Self::Risk => "risk",
        }
    }

    /// Parse the database column representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "commitment" => Some(Self::Commitment),
            "action" => Some(Self::Action),
            "follow-up" => Some(Self::FollowUp),
            "risk" => Some(Self::Risk),
            _ => None,
        }
    }
}

/// Priority carried on the commitment record.
///
/// Drives the calendar scheduling window: urgent work anchors to the
/// morning, everything else to the afternoon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Normal,
    Low,
}

impl Priority {
    /// Whether this priority anchors to the morning calendar slot.
    #[must_use]
    pub fn is_urgent(self) -> bool {
        matches!(self, Self::High)
    }

    /// Database column representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }

    /// Parse the database column representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "high" => Some(Self::High),
            "normal" => Some(Self::Normal),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// The three link slots on a commitment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalLink {
    CalendarEvent,
    MicrosoftTask,
    JiraIssue,
}

impl ExternalLink {
    /// Column name backing this link slot.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::CalendarEvent => "calendar_event_id",
            Self::MicrosoftTask => "microsoft_task_id",
            Self::JiraIssue => "jira_task_id",
        }
    }
}

/// Commitment - the internal task record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commitment {
    pub id: String,
    pub profile_id: String,
    pub description: String,
    pub assignee: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: CommitmentStatus,
    pub task_type: TaskType,
    pub priority: Priority,
    pub calendar_event_id: Option<String>,
    pub jira_task_id: Option<String>,
    pub microsoft_task_id: Option<String>,
    pub completion_note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Commitment {
    /// Create a pending, unlinked commitment owned by a profile.
    #[must_use]
    pub fn new(
        profile_id: impl Into<String>,
        description: impl Into<String>,
        task_type: TaskType,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            profile_id: profile_id.into(),
            description: description.into(),
            assignee: None,
            deadline: None,
            status: CommitmentStatus::Pending,
            task_type,
            priority: Priority::Normal,
            calendar_event_id: None,
            jira_task_id: None,
            microsoft_task_id: None,
            completion_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Read the external id stored in the given link slot.
    #[must_use]
    pub fn external_id(&self, link: ExternalLink) -> Option<&str> {
        match link {
            ExternalLink::CalendarEvent => self.calendar_event_id.as_deref(),
            ExternalLink::MicrosoftTask => self.microsoft_task_id.as_deref(),
            ExternalLink::JiraIssue => self.jira_task_id.as_deref(),
        }
    }

    /// Whether the given link slot is populated.
    #[must_use]
    pub fn is_linked(&self, link: ExternalLink) -> bool {
        self.external_id(link).is_some()
    }
}

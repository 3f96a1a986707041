//! Core ticket data types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Enums
// ============================================================================

/// How urgent a ticket is.
///
/// Deserialization is lenient: unknown, empty or `null` values become `Medium`.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, Hash)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Parse a priority leniently (case-insensitive, surrounding whitespace ignored).
    ///
    /// Returns `None` for empty or unknown values so callers can apply their default.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(Priority::parse).unwrap_or_default())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a ticket is in its lifecycle.
///
/// Any status may follow any other; the helpdesk does not enforce transitions.
/// Unknown stored values read back as `New`.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    New,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::New,
        Status::InProgress,
        Status::Resolved,
        Status::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::New => "New",
            Status::InProgress => "In Progress",
            Status::Resolved => "Resolved",
            Status::Closed => "Closed",
        }
    }

    /// Parse a status leniently. Accepts `In Progress`, `in_progress` and `InProgress`.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "new" => Some(Status::New),
            "inprogress" => Some(Status::InProgress),
            "resolved" => Some(Status::Resolved),
            "closed" => Some(Status::Closed),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(Status::parse).unwrap_or_default())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Records
// ============================================================================

/// A note attached to a ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique within the owning ticket.
    pub id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub text: String,
    #[serde(default = "default_author", deserialize_with = "author_or_default")]
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// A helpdesk ticket with its comment thread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Unique identifier (UUID v4).
    pub id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub subject: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    /// Assignee. `None` means unassigned and serializes as `null`.
    #[serde(default)]
    pub agent: Option<String>,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation, never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,
    /// Append-only, in insertion order.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Ticket {
    /// Bump `updated_at` to `now`, never moving it backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Request to create a new ticket.
#[derive(Debug, Clone, Default)]
pub struct NewTicket {
    pub subject: String,
    pub description: String,
    /// Defaults to `Medium` when `None`.
    pub priority: Option<Priority>,
    /// Empty strings are treated as unassigned.
    pub agent: Option<String>,
}

impl NewTicket {
    pub fn new(subject: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }
}

/// Partial update of the mutable ticket fields.
///
/// Fields left as `None` are not touched. `agent: Some(None)` unassigns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketUpdate {
    pub status: Option<Status>,
    pub agent: Option<Option<String>>,
    pub priority: Option<Priority>,
}

impl TicketUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_agent(mut self, agent: Option<String>) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.agent.is_none() && self.priority.is_none()
    }

    /// Apply the update to `ticket`. Does not touch timestamps.
    pub(crate) fn apply_to(&self, ticket: &mut Ticket) {
        if let Some(status) = self.status {
            ticket.status = status;
        }
        if let Some(agent) = &self.agent {
            ticket.agent = normalize_agent(agent.clone());
        }
        if let Some(priority) = self.priority {
            ticket.priority = priority;
        }
    }
}

/// Request to add a comment to a ticket.
#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub text: String,
    /// Defaults to [`DEFAULT_COMMENT_AUTHOR`] when `None` or empty.
    pub author: Option<String>,
}

impl NewComment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// Author recorded when a comment is posted without one.
pub const DEFAULT_COMMENT_AUTHOR: &str = "User";

/// Missing text fields in stored records read back as empty strings.
fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_author() -> String {
    DEFAULT_COMMENT_AUTHOR.to_string()
}

fn author_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(default_author))
}

/// Empty or whitespace-only agent names mean "unassigned".
pub(crate) fn normalize_agent(agent: Option<String>) -> Option<String> {
    agent.filter(|a| !a.trim().is_empty())
}

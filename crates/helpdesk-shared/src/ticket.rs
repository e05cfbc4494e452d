//! Ticket types and the status state machine.
//!
//! Every ticket starts OPEN. Status changes must follow the transition table:
//!
//! | From        | Allowed to           |
//! |-------------|----------------------|
//! | OPEN        | IN_PROGRESS, CLOSED  |
//! | IN_PROGRESS | RESOLVED, CLOSED     |
//! | RESOLVED    | CLOSED               |
//! | CLOSED      | (terminal)           |
//!
//! Assignment forces IN_PROGRESS outside of this table; see the lifecycle
//! engine in `helpdeskd`.

use crate::{ParseEnumError, TicketId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Ticket status in the support workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Created, nobody working on it yet
    #[default]
    Open,
    /// Assigned and being worked
    InProgress,
    /// Fix delivered, awaiting closure
    Resolved,
    /// Terminal
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
        }
    }

    /// Statuses reachable from this one in a single transition.
    pub fn allowed_next(&self) -> &'static [TicketStatus] {
        match self {
            Self::Open => &[Self::InProgress, Self::Closed],
            Self::InProgress => &[Self::Resolved, Self::Closed],
            Self::Resolved => &[Self::Closed],
            Self::Closed => &[],
        }
    }

    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }

    /// Validate a move to `next` against the transition table.
    pub fn transition_to(&self, next: TicketStatus) -> Result<TicketStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: *self,
                to: next,
            })
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "RESOLVED" => Ok(Self::Resolved),
            "CLOSED" => Ok(Self::Closed),
            other => Err(ParseEnumError::new("status", other)),
        }
    }
}

/// Rejected status change, carrying the attempted pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid status transition from {from} to {to}")]
pub struct TransitionError {
    pub from: TicketStatus,
    pub to: TicketStatus,
}

/// Ticket priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            other => Err(ParseEnumError::new("priority", other)),
        }
    }
}

/// A support ticket as persisted in the ticket store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TicketStatus,
    /// Creator, fixed at creation
    pub created_by: UserId,
    /// Current assignee, changed only by assignment
    pub assigned_to: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    pub fn is_assigned_to(&self, user: UserId) -> bool {
        self.assigned_to == Some(user)
    }
}

/// Listing row returned by the ticket query service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketSummary {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub creator_name: String,
    pub assignee_name: Option<String>,
}

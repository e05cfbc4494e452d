//! Request payloads and their validated forms.
//!
//! Raw `*Request` structs mirror what clients send: every field optional so
//! a missing field is reported as a validation error rather than a decode
//! failure. `validate()` turns them into well-typed inputs that the
//! lifecycle engine and stores accept without further checks.

use crate::{Priority, Role, TicketStatus, UserId};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

pub const TITLE_MIN_CHARS: usize = 5;
pub const DESCRIPTION_MIN_CHARS: usize = 10;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} minimum length is {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("Invalid {field}")]
    Invalid { field: &'static str, value: String },
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::Missing(field)),
    }
}

fn min_chars(value: String, field: &'static str, min: usize) -> Result<String, ValidationError> {
    if value.chars().count() < min {
        Err(ValidationError::TooShort { field, min })
    } else {
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl TicketRequest {
    pub fn validate(self) -> Result<NewTicket, ValidationError> {
        let title = min_chars(
            self.title.unwrap_or_default(),
            "Title",
            TITLE_MIN_CHARS,
        )?;
        let description = min_chars(
            self.description.unwrap_or_default(),
            "Description",
            DESCRIPTION_MIN_CHARS,
        )?;
        let priority = match self.priority {
            None => Priority::default(),
            Some(p) => p.parse().map_err(|_| ValidationError::Invalid {
                field: "priority",
                value: p,
            })?,
        };
        Ok(NewTicket {
            title,
            description,
            priority,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub status: TicketStatus,
}

impl StatusRequest {
    pub fn validate(self) -> Result<StatusChange, ValidationError> {
        let raw = required(self.status, "Status")?;
        let status = raw
            .parse()
            .map_err(|_| ValidationError::Invalid {
                field: "status",
                value: raw,
            })?;
        Ok(StatusChange { status })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignRequest {
    #[serde(default, rename = "assigneeId", alias = "assignee_id")]
    pub assignee_id: Option<UserId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub assignee_id: UserId,
}

impl AssignRequest {
    pub fn validate(self) -> Result<Assignment, ValidationError> {
        let assignee_id = self
            .assignee_id
            .ok_or(ValidationError::Missing("Assignee ID"))?;
        Ok(Assignment { assignee_id })
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl UserRequest {
    pub fn validate(self) -> Result<NewUser, ValidationError> {
        let name = required(self.name, "Name")?;
        let email = required(self.email, "Email")?;
        if !EMAIL_PATTERN.is_match(&email) {
            return Err(ValidationError::Invalid {
                field: "email",
                value: email,
            });
        }
        let raw_role = required(self.role, "Role")?;
        let role = raw_role.parse().map_err(|_| ValidationError::Invalid {
            field: "role",
            value: raw_role,
        })?;
        Ok(NewUser {
            name: name.trim().to_string(),
            email: email.to_lowercase(),
            role,
        })
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub comment: String,
}

impl CommentRequest {
    pub fn validate(self) -> Result<NewComment, ValidationError> {
        let comment = required(self.comment, "Comment")?;
        Ok(NewComment { comment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(title: &str, description: &str, priority: Option<&str>) -> TicketRequest {
        TicketRequest {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            priority: priority.map(str::to_string),
        }
    }

    #[test]
    fn test_ticket_defaults_priority() {
        let t = ticket("Printer jam", "Tray 2 is jammed again", None)
            .validate()
            .unwrap();
        assert_eq!(t.priority, Priority::Medium);
    }

    #[test]
    fn test_ticket_title_too_short() {
        let err = ticket("Help", "Tray 2 is jammed again", None)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "Title minimum length is 5 characters");
    }

    #[test]
    fn test_ticket_description_too_short() {
        let err = ticket("Printer jam", "jammed", None).validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooShort {
                field: "Description",
                min: DESCRIPTION_MIN_CHARS
            }
        );
    }

    #[test]
    fn test_ticket_rejects_unknown_priority() {
        let err = ticket("Printer jam", "Tray 2 is jammed again", Some("URGENT"))
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid priority");
    }

    #[test]
    fn test_title_length_counts_chars_not_bytes() {
        // four multi-byte characters
        assert!(ticket("ÄÖÜß", "Tray 2 is jammed again", None)
            .validate()
            .is_err());
    }

    #[test]
    fn test_status_required_and_enumerated() {
        assert_eq!(
            StatusRequest { status: None }.validate().unwrap_err(),
            ValidationError::Missing("Status")
        );
        assert!(StatusRequest {
            status: Some("DONE".into())
        }
        .validate()
        .is_err());
        assert_eq!(
            StatusRequest {
                status: Some("RESOLVED".into())
            }
            .validate()
            .unwrap()
            .status,
            TicketStatus::Resolved
        );
    }

    #[test]
    fn test_assign_request_accepts_camel_case() {
        let req: AssignRequest = serde_json::from_str(r#"{"assigneeId": 4}"#).unwrap();
        assert_eq!(req.validate().unwrap().assignee_id, 4);
        let req: AssignRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(
            req.validate().unwrap_err().to_string(),
            "Assignee ID is required"
        );
    }

    #[test]
    fn test_user_validation() {
        let req = UserRequest {
            name: Some(" Dana ".into()),
            email: Some("Dana@Example.com".into()),
            role: Some("SUPPORT".into()),
        };
        let user = req.validate().unwrap();
        assert_eq!(user.name, "Dana");
        assert_eq!(user.email, "dana@example.com");
        assert_eq!(user.role, Role::Support);

        let bad_email = UserRequest {
            name: Some("Dana".into()),
            email: Some("not-an-email".into()),
            role: Some("USER".into()),
        };
        assert_eq!(bad_email.validate().unwrap_err().to_string(), "Invalid email");
    }

    #[test]
    fn test_empty_comment_rejected() {
        let err = CommentRequest {
            comment: Some("   ".into()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "Comment is required");
    }
}

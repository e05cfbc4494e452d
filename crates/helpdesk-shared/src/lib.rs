//! Shared types for the helpdesk components.
//!
//! Domain model (tickets, status log, comments, users), the ticket status
//! transition table, the role permission matrix and validated request inputs.
//! Nothing in this crate performs I/O.

pub mod comment;
pub mod input;
pub mod permissions;
pub mod role;
pub mod status_log;
pub mod ticket;
pub mod user;

pub use comment::{Comment, CommentView};
pub use input::{
    AssignRequest, Assignment, CommentRequest, NewComment, NewTicket, NewUser, StatusChange,
    StatusRequest, TicketRequest, UserRequest, ValidationError,
};
pub use permissions::{
    authorize, can_access_ticket, check_status_change, Denied, Operation, StatusDenial, StatusRule,
};
pub use role::{Identity, Role};
pub use status_log::StatusLogEntry;
pub use ticket::{Priority, Ticket, TicketStatus, TicketSummary, TransitionError};
pub use user::User;

/// Identifier of a user row.
pub type UserId = i64;

/// Identifier of a ticket row.
pub type TicketId = i64;

/// Identifier of a comment row.
pub type CommentId = i64;

/// Error returned when a stored or submitted enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

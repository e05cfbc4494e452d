//! Error taxonomy for helpdesk operations.

use helpdesk_shared::permissions::{Denied, StatusDenial};
use helpdesk_shared::{TicketStatus, TransitionError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HelpdeskError {
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: TicketStatus, to: TicketStatus },

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HelpdeskError {
    /// Short label for metrics and structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Store(_) | Self::Internal(_) => "internal",
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Internal(_))
    }
}

impl From<ValidationError> for HelpdeskError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<TransitionError> for HelpdeskError {
    fn from(err: TransitionError) -> Self {
        Self::InvalidTransition {
            from: err.from,
            to: err.to,
        }
    }
}

impl From<StatusDenial> for HelpdeskError {
    fn from(err: StatusDenial) -> Self {
        Self::Forbidden(err.to_string())
    }
}

impl From<Denied> for HelpdeskError {
    fn from(err: Denied) -> Self {
        Self::Forbidden(err.to_string())
    }
}

impl From<tokio::task::JoinError> for HelpdeskError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("blocking task failed: {}", err))
    }
}

pub type Result<T, E = HelpdeskError> = std::result::Result<T, E>;

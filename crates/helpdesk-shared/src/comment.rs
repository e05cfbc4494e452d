//! Ticket comments.

use crate::{CommentId, Role, TicketId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub ticket_id: TicketId,
    pub user_id: UserId,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Comment as shown in a ticket thread, with its author resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: CommentId,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub author_name: String,
    pub author_role: Role,
}

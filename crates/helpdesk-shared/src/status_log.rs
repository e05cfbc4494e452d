//! Status log entries: the append-only audit trail of ticket transitions.

use crate::{TicketId, TicketStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One accepted status transition. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusLogEntry {
    pub id: i64,
    pub ticket_id: TicketId,
    pub old_status: TicketStatus,
    pub new_status: TicketStatus,
    pub changed_by: UserId,
    pub changed_at: DateTime<Utc>,
}

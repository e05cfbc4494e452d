//! Ticket lifecycle engine.
//!
//! Applies assignment and status transitions. Each operation is one
//! immediate transaction: the ticket row is read after the write lock is
//! taken, checked, written together with its status log entry, and
//! committed. Any rejection rolls the transaction back, so a status change
//! without its log entry (or the reverse) is never observable.
//!
//! Check order for status updates: existence, then the role gate, then the
//! transition table.

use crate::db::with_transaction;
use crate::error::{HelpdeskError, Result};
use crate::store::{status_log, tickets, users};
use chrono::Utc;
use helpdesk_shared::permissions::check_status_change;
use helpdesk_shared::{Identity, StatusLogEntry, Ticket, TicketId, TicketStatus, UserId};
use rusqlite::Connection;
use tracing::{error, info, warn};

/// Result of an accepted assignment
#[derive(Debug, Clone, PartialEq)]
pub struct AssignOutcome {
    pub ticket: Ticket,
    /// Present only when assignment changed the status
    pub transition: Option<StatusLogEntry>,
}

/// Result of an accepted status update
#[derive(Debug, Clone, PartialEq)]
pub struct StatusOutcome {
    pub ticket: Ticket,
    pub transition: StatusLogEntry,
}

/// Assign a ticket to a SUPPORT or MANAGER identity.
///
/// Forces the status to IN_PROGRESS whatever it was before, including
/// RESOLVED and CLOSED. A log entry is written only if the status actually
/// changed, so re-assigning an in-progress ticket leaves the trail alone.
pub fn assign_ticket(
    conn: &mut Connection,
    ticket_id: TicketId,
    assignee_id: UserId,
    requester: UserId,
) -> Result<AssignOutcome> {
    let result = with_transaction(conn, |tx| {
        let mut ticket = tickets::lock(tx, ticket_id)?.ok_or(HelpdeskError::NotFound("Ticket"))?;
        // Stamped under the write lock so log order matches commit order
        let now = Utc::now();

        let assignee = users::find(tx, assignee_id)?
            .ok_or_else(|| HelpdeskError::InvalidInput("Assignee not found".to_string()))?;
        if !assignee.role.is_assignable() {
            return Err(HelpdeskError::InvalidInput(
                "Cannot assign ticket to a USER role".to_string(),
            ));
        }

        let previous = ticket.status;
        tickets::set_assignment(tx, ticket_id, assignee_id, TicketStatus::InProgress)?;

        let transition = if previous != TicketStatus::InProgress {
            Some(status_log::append(
                tx,
                ticket_id,
                previous,
                TicketStatus::InProgress,
                requester,
                now,
            )?)
        } else {
            None
        };

        ticket.assigned_to = Some(assignee_id);
        ticket.status = TicketStatus::InProgress;
        Ok(AssignOutcome { ticket, transition })
    });

    match &result {
        Ok(outcome) => info!(
            "Ticket {} assigned to {} by {} ({})",
            ticket_id,
            assignee_id,
            requester,
            match &outcome.transition {
                Some(t) => format!("{} -> {}", t.old_status, t.new_status),
                None => "status unchanged".to_string(),
            }
        ),
        Err(err) => log_rejection(
            "assign",
            ticket_id,
            requester,
            &format!("assignee {}", assignee_id),
            err,
        ),
    }

    result
}

/// Move a ticket to `target` on behalf of `requester`.
pub fn update_status(
    conn: &mut Connection,
    ticket_id: TicketId,
    target: TicketStatus,
    requester: Identity,
) -> Result<StatusOutcome> {
    let result = with_transaction(conn, |tx| {
        let mut ticket = tickets::lock(tx, ticket_id)?.ok_or(HelpdeskError::NotFound("Ticket"))?;
        let now = Utc::now();

        check_status_change(requester.role, requester.id, ticket.assigned_to, target)?;
        let next = ticket.status.transition_to(target)?;

        tickets::set_status(tx, ticket_id, next)?;
        let transition = status_log::append(tx, ticket_id, ticket.status, next, requester.id, now)?;

        ticket.status = next;
        Ok(StatusOutcome { ticket, transition })
    });

    match &result {
        Ok(outcome) => info!(
            "Ticket {} status {} -> {} by {} ({})",
            ticket_id,
            outcome.transition.old_status,
            outcome.transition.new_status,
            requester.id,
            requester.role
        ),
        Err(err) => log_rejection(
            "update_status",
            ticket_id,
            requester.id,
            &format!("-> {} as {}", target, requester.role),
            err,
        ),
    }

    result
}

fn log_rejection(
    operation: &str,
    ticket_id: TicketId,
    requester: UserId,
    attempted: &str,
    err: &HelpdeskError,
) {
    if err.is_internal() {
        error!(
            "{} failed: ticket={} requester={} attempted=[{}]: {}",
            operation, ticket_id, requester, attempted, err
        );
    } else {
        warn!(
            "{} rejected ({}): ticket={} requester={} attempted=[{}]: {}",
            operation,
            err.reason(),
            ticket_id,
            requester,
            attempted,
            err
        );
    }
}

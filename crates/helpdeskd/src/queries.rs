//! Role-scoped read access to tickets and their threads.

use crate::error::{HelpdeskError, Result};
use crate::store::tickets::{self, TicketScope};
use crate::store::{comments, status_log};
use helpdesk_shared::{
    can_access_ticket, CommentView, Identity, Role, StatusLogEntry, Ticket, TicketId, TicketSummary,
};
use rusqlite::Connection;

const NO_ACCESS: &str = "Forbidden: You do not have access to this ticket";

/// Listing scope for a viewer.
pub fn scope_for(viewer: Identity) -> TicketScope {
    match viewer.role {
        Role::Manager => TicketScope::All,
        Role::Support => TicketScope::AssignedTo(viewer.id),
        Role::User => TicketScope::CreatedBy(viewer.id),
    }
}

/// Tickets visible to `viewer`, newest first.
pub fn list_tickets(conn: &Connection, viewer: Identity) -> Result<Vec<TicketSummary>> {
    Ok(tickets::list_summaries(conn, scope_for(viewer))?)
}

/// Load a ticket the viewer may see.
///
/// A missing ticket is NotFound for managers. Everyone else gets Forbidden
/// either way, so ticket ids outside a caller's scope are not probeable.
pub fn accessible_ticket(conn: &Connection, ticket_id: TicketId, viewer: Identity) -> Result<Ticket> {
    match tickets::find(conn, ticket_id)? {
        Some(ticket) if can_access_ticket(viewer, &ticket) => Ok(ticket),
        None if viewer.role == Role::Manager => Err(HelpdeskError::NotFound("Ticket")),
        _ => Err(HelpdeskError::Forbidden(NO_ACCESS.to_string())),
    }
}

/// Status history of a ticket, oldest first.
pub fn ticket_history(
    conn: &Connection,
    ticket_id: TicketId,
    viewer: Identity,
) -> Result<Vec<StatusLogEntry>> {
    accessible_ticket(conn, ticket_id, viewer)?;
    Ok(status_log::for_ticket(conn, ticket_id)?)
}

/// Comment thread of a ticket, oldest first.
pub fn ticket_comments(
    conn: &Connection,
    ticket_id: TicketId,
    viewer: Identity,
) -> Result<Vec<CommentView>> {
    accessible_ticket(conn, ticket_id, viewer)?;
    Ok(comments::list_for_ticket(conn, ticket_id)?)
}

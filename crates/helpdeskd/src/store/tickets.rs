//! Ticket store.

use super::enum_column;
use chrono::{DateTime, Utc};
use helpdesk_shared::{NewTicket, Ticket, TicketId, TicketStatus, TicketSummary, UserId};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction};

const TICKET_COLUMNS: &str =
    "id, title, description, priority, status, created_by, assigned_to, created_at";

fn map_ticket(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority: enum_column(row, 3)?,
        status: enum_column(row, 4)?,
        created_by: row.get(5)?,
        assigned_to: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Insert a new ticket in OPEN status.
pub fn insert(
    conn: &Connection,
    creator: UserId,
    ticket: &NewTicket,
    now: DateTime<Utc>,
) -> rusqlite::Result<Ticket> {
    conn.execute(
        "INSERT INTO tickets (title, description, priority, status, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            &ticket.title,
            &ticket.description,
            ticket.priority.as_str(),
            TicketStatus::Open.as_str(),
            creator,
            now
        ],
    )?;

    Ok(Ticket {
        id: conn.last_insert_rowid(),
        title: ticket.title.clone(),
        description: ticket.description.clone(),
        priority: ticket.priority,
        status: TicketStatus::Open,
        created_by: creator,
        assigned_to: None,
        created_at: now,
    })
}

pub fn find(conn: &Connection, id: TicketId) -> rusqlite::Result<Option<Ticket>> {
    conn.query_row(
        &format!("SELECT {} FROM tickets WHERE id = ?1", TICKET_COLUMNS),
        params![id],
        map_ticket,
    )
    .optional()
}

/// Read a ticket for a check-and-write.
///
/// Takes a `Transaction` rather than a bare connection: the row is only
/// stable for the caller if the transaction was opened immediate (see
/// `db::with_transaction`), so the database write lock is already held.
pub fn lock(tx: &Transaction<'_>, id: TicketId) -> rusqlite::Result<Option<Ticket>> {
    find(tx, id)
}

pub fn set_status(conn: &Connection, id: TicketId, status: TicketStatus) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE tickets SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(())
}

pub fn set_assignment(
    conn: &Connection,
    id: TicketId,
    assignee: UserId,
    status: TicketStatus,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE tickets SET assigned_to = ?1, status = ?2 WHERE id = ?3",
        params![assignee, status.as_str(), id],
    )?;
    Ok(())
}

/// Delete a ticket. Comments cascade; status log rows stay.
pub fn delete(conn: &Connection, id: TicketId) -> rusqlite::Result<bool> {
    let affected = conn.execute("DELETE FROM tickets WHERE id = ?1", params![id])?;
    Ok(affected > 0)
}

/// Which tickets a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketScope {
    All,
    AssignedTo(UserId),
    CreatedBy(UserId),
}

/// Listing rows with creator and assignee names, newest first.
pub fn list_summaries(conn: &Connection, scope: TicketScope) -> rusqlite::Result<Vec<TicketSummary>> {
    let (filter, param) = match scope {
        TicketScope::All => ("", None),
        TicketScope::AssignedTo(user) => ("WHERE t.assigned_to = ?1", Some(user)),
        TicketScope::CreatedBy(user) => ("WHERE t.created_by = ?1", Some(user)),
    };

    let sql = format!(
        "SELECT t.id, t.title, t.description, t.status, t.priority, t.created_at,
                creator.name, assign.name
         FROM tickets t
         JOIN users creator ON t.created_by = creator.id
         LEFT JOIN users assign ON t.assigned_to = assign.id
         {}
         ORDER BY t.created_at DESC, t.id DESC",
        filter
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(param), |row| {
        Ok(TicketSummary {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            status: enum_column(row, 3)?,
            priority: enum_column(row, 4)?,
            created_at: row.get(5)?,
            creator_name: row.get(6)?,
            assignee_name: row.get(7)?,
        })
    })?;

    rows.collect()
}

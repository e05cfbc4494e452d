//! Status log store. Append and read only; the schema triggers reject
//! UPDATE and DELETE on the table.

use super::enum_column;
use chrono::{DateTime, Utc};
use helpdesk_shared::{StatusLogEntry, TicketId, TicketStatus, UserId};
use rusqlite::{params, Connection};

pub fn append(
    conn: &Connection,
    ticket_id: TicketId,
    old_status: TicketStatus,
    new_status: TicketStatus,
    changed_by: UserId,
    changed_at: DateTime<Utc>,
) -> rusqlite::Result<StatusLogEntry> {
    conn.execute(
        "INSERT INTO ticket_status_logs (ticket_id, old_status, new_status, changed_by, changed_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            ticket_id,
            old_status.as_str(),
            new_status.as_str(),
            changed_by,
            changed_at
        ],
    )?;

    Ok(StatusLogEntry {
        id: conn.last_insert_rowid(),
        ticket_id,
        old_status,
        new_status,
        changed_by,
        changed_at,
    })
}

/// Entries for one ticket in the order they were committed.
pub fn for_ticket(conn: &Connection, ticket_id: TicketId) -> rusqlite::Result<Vec<StatusLogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, ticket_id, old_status, new_status, changed_by, changed_at
         FROM ticket_status_logs
         WHERE ticket_id = ?1
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![ticket_id], |row| {
        Ok(StatusLogEntry {
            id: row.get(0)?,
            ticket_id: row.get(1)?,
            old_status: enum_column(row, 2)?,
            new_status: enum_column(row, 3)?,
            changed_by: row.get(4)?,
            changed_at: row.get(5)?,
        })
    })?;

    rows.collect()
}

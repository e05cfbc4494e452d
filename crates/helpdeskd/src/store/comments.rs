//! Comment store.

use super::enum_column;
use chrono::{DateTime, Utc};
use helpdesk_shared::{Comment, CommentId, CommentView, TicketId, UserId};
use rusqlite::{params, Connection, OptionalExtension};

pub fn insert(
    conn: &Connection,
    ticket_id: TicketId,
    author: UserId,
    text: &str,
    now: DateTime<Utc>,
) -> rusqlite::Result<Comment> {
    conn.execute(
        "INSERT INTO ticket_comments (ticket_id, user_id, comment, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![ticket_id, author, text, now],
    )?;

    Ok(Comment {
        id: conn.last_insert_rowid(),
        ticket_id,
        user_id: author,
        comment: text.to_string(),
        created_at: now,
    })
}

pub fn find(conn: &Connection, id: CommentId) -> rusqlite::Result<Option<Comment>> {
    conn.query_row(
        "SELECT id, ticket_id, user_id, comment, created_at FROM ticket_comments WHERE id = ?1",
        params![id],
        |row| {
            Ok(Comment {
                id: row.get(0)?,
                ticket_id: row.get(1)?,
                user_id: row.get(2)?,
                comment: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )
    .optional()
}

/// Thread for a ticket, oldest first, with author name and role.
pub fn list_for_ticket(conn: &Connection, ticket_id: TicketId) -> rusqlite::Result<Vec<CommentView>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.comment, c.created_at, u.name, u.role
         FROM ticket_comments c
         JOIN users u ON c.user_id = u.id
         WHERE c.ticket_id = ?1
         ORDER BY c.created_at ASC, c.id ASC",
    )?;

    let rows = stmt.query_map(params![ticket_id], |row| {
        Ok(CommentView {
            id: row.get(0)?,
            comment: row.get(1)?,
            created_at: row.get(2)?,
            author_name: row.get(3)?,
            author_role: enum_column(row, 4)?,
        })
    })?;

    rows.collect()
}

pub fn update_text(conn: &Connection, id: CommentId, text: &str) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE ticket_comments SET comment = ?1 WHERE id = ?2",
        params![text, id],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: CommentId) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM ticket_comments WHERE id = ?1", params![id])?;
    Ok(())
}

//! API token store. Only SHA-256 digests of tokens are persisted.

use super::enum_column;
use chrono::{DateTime, Utc};
use helpdesk_shared::{Identity, UserId};
use rusqlite::{params, Connection, OptionalExtension};

pub fn insert(
    conn: &Connection,
    token_hash: &str,
    user_id: UserId,
    now: DateTime<Utc>,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO api_tokens (token_hash, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![token_hash, user_id, now],
    )?;
    Ok(())
}

/// Resolve a token digest to the identity of its owner, role included.
pub fn resolve(conn: &Connection, token_hash: &str) -> rusqlite::Result<Option<Identity>> {
    conn.query_row(
        "SELECT u.id, u.role
         FROM api_tokens t
         JOIN users u ON t.user_id = u.id
         WHERE t.token_hash = ?1",
        params![token_hash],
        |row| Ok(Identity::new(row.get(0)?, enum_column(row, 1)?)),
    )
    .optional()
}

//! User store.

use super::enum_column;
use chrono::{DateTime, Utc};
use helpdesk_shared::{NewUser, User, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: enum_column(row, 3)?,
        created_at: row.get(4)?,
    })
}

pub fn insert(conn: &Connection, user: &NewUser, now: DateTime<Utc>) -> rusqlite::Result<User> {
    conn.execute(
        "INSERT INTO users (name, email, role, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![&user.name, &user.email, user.role.as_str(), now],
    )?;

    Ok(User {
        id: conn.last_insert_rowid(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
        created_at: now,
    })
}

pub fn find(conn: &Connection, id: UserId) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT id, name, email, role, created_at FROM users WHERE id = ?1",
        params![id],
        map_user,
    )
    .optional()
}

pub fn email_exists(conn: &Connection, email: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
        params![email],
        |row| row.get(0),
    )
}

pub fn list(conn: &Connection) -> rusqlite::Result<Vec<User>> {
    let mut stmt =
        conn.prepare("SELECT id, name, email, role, created_at FROM users ORDER BY id ASC")?;
    let rows = stmt.query_map([], map_user)?;
    rows.collect()
}

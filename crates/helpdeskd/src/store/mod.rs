//! Row-level access to the helpdesk tables.
//!
//! Store functions take a `&Connection` (a `&Transaction` derefs to one) and
//! never open transactions themselves; callers decide the atomic scope.

pub mod comments;
pub mod status_log;
pub mod tickets;
pub mod tokens;
pub mod users;

use helpdesk_shared::ParseEnumError;
use rusqlite::types::Type;
use rusqlite::Row;
use std::str::FromStr;

/// Read a TEXT column holding one of the shared enums.
pub(crate) fn enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

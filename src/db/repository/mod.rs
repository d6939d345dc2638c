//! Repository layer — entity-scoped database operations.
//!
//! All functions take a borrowed `Connection`; callers hold the
//! `Database` lock for the duration of one unit of work.

mod actor;
mod appointment;
mod notification;

pub use actor::*;
pub use appointment::*;
pub use notification::*;

use rusqlite::types::Type;
use uuid::Uuid;

/// Map a stored TEXT uuid back to `Uuid` inside a row closure.
fn column_uuid(idx: usize, s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Map a stored TEXT enum value back to its type inside a row closure.
fn column_enum<T>(idx: usize, s: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = super::DatabaseError>,
{
    s.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

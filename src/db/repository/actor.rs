use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

fn row_to_actor(row: &Row) -> rusqlite::Result<Actor> {
    let id: String = row.get(0)?;
    let role: String = row.get(3)?;

    Ok(Actor {
        id: super::column_uuid(0, &id)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: super::column_enum(3, &role)?,
        created_at: row.get(4)?,
    })
}

pub fn insert_actor(
    conn: &Connection,
    actor: &Actor,
    token_hash: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO actors (id, name, email, role, token_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            actor.id.to_string(),
            actor.name,
            actor.email,
            actor.role.as_str(),
            token_hash,
            actor.created_at,
        ],
    )?;
    Ok(())
}

pub fn find_actor_by_token_hash(
    conn: &Connection,
    token_hash: &str,
) -> Result<Option<Actor>, DatabaseError> {
    let actor = conn
        .query_row(
            "SELECT id, name, email, role, created_at FROM actors WHERE token_hash = ?1",
            params![token_hash],
            row_to_actor,
        )
        .optional()?;
    Ok(actor)
}

pub fn find_actor_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Actor>, DatabaseError> {
    let actor = conn
        .query_row(
            "SELECT id, name, email, role, created_at FROM actors WHERE email = ?1",
            params![email],
            row_to_actor,
        )
        .optional()?;
    Ok(actor)
}

/// Replace the actor's bearer-token hash (login re-issues the token).
pub fn update_actor_token(
    conn: &Connection,
    id: &Uuid,
    token_hash: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE actors SET token_hash = ?2 WHERE id = ?1",
        params![id.to_string(), token_hash],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "actor".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

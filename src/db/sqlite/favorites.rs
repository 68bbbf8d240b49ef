//! Favorite stocks

use crate::db::sqlite::models::Favorite;
use crate::error::{AppError, Result};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

/// Insert a favorite and return it; a code already present is a `Conflict`
pub fn insert(conn: &Connection, code: &str, name: &str) -> Result<Favorite> {
    conn.execute(
        "INSERT INTO favorites (code, name) VALUES (?1, ?2)",
        params![code, name],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(ref err, _) if err.code == ErrorCode::ConstraintViolation => {
            AppError::Conflict("Stock is already in favorites.".to_string())
        }
        e => e.into(),
    })?;

    let id = conn.last_insert_rowid();
    tracing::info!("Added favorite {} ({})", code, id);

    Ok(Favorite {
        id,
        code: code.to_string(),
        name: name.to_string(),
    })
}

/// Get favorite by stock code
pub fn get_by_code(conn: &Connection, code: &str) -> Result<Option<Favorite>> {
    let favorite = conn
        .query_row(
            "SELECT id, code, name FROM favorites WHERE code = ?1",
            params![code],
            |row| {
                Ok(Favorite {
                    id: row.get(0)?,
                    code: row.get(1)?,
                    name: row.get(2)?,
                })
            },
        )
        .optional()?;

    Ok(favorite)
}

/// All favorites in insertion order
pub fn list(conn: &Connection) -> Result<Vec<Favorite>> {
    let mut stmt = conn.prepare("SELECT id, code, name FROM favorites ORDER BY id")?;

    let favorites = stmt
        .query_map([], |row| {
            Ok(Favorite {
                id: row.get(0)?,
                code: row.get(1)?,
                name: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(favorites)
}

/// Delete a favorite, returning how many rows went away
pub fn delete_by_code(conn: &Connection, code: &str) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM favorites WHERE code = ?1", params![code])?;
    Ok(deleted)
}

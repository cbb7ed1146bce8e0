use rusqlite::{params, OptionalExtension, Row};
use shared_types::{ObligationKind, ObligationType};

use super::{is_unique_violation, parse_column, AsyncDbConnection, DbError, DbResult};

fn obligation_from_row(row: &Row<'_>) -> rusqlite::Result<ObligationType> {
    Ok(ObligationType {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: parse_column(row, 2)?,
    })
}

pub async fn list_obligation_types(
    conn: AsyncDbConnection,
    kind: Option<ObligationKind>,
) -> DbResult<Vec<ObligationType>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(
        "SELECT id, name, kind FROM obligation_types
         WHERE ?1 IS NULL OR kind = ?1
         ORDER BY name, id",
    )?;

    let obligations = stmt
        .query_map(params![kind.map(|k| k.as_str())], obligation_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(obligations)
}

pub async fn get_obligation_type(conn: AsyncDbConnection, id: i64) -> DbResult<ObligationType> {
    let conn = conn.lock().await?;

    conn.query_row(
        "SELECT id, name, kind FROM obligation_types WHERE id = ?1",
        [id],
        obligation_from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("Obligation type {}", id)))
}

pub async fn insert_obligation_type(
    conn: AsyncDbConnection,
    name: &str,
    kind: ObligationKind,
) -> DbResult<ObligationType> {
    let conn = conn.lock().await?;

    conn.query_row(
        "INSERT INTO obligation_types (name, kind) VALUES (?1, ?2) RETURNING id, name, kind",
        params![name, kind.as_str()],
        obligation_from_row,
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            DbError::Conflict(format!("Obligation type '{}' already exists", name))
        } else {
            e.into()
        }
    })
}

/// Delete a catalog entry; refused while any company is bound to it
pub async fn delete_obligation_type(conn: AsyncDbConnection, id: i64) -> DbResult<()> {
    let conn = conn.lock().await?;

    let bound: i64 = conn.query_row(
        "SELECT COUNT(*) FROM company_obligations WHERE obligation_type_id = ?1",
        [id],
        |row| row.get(0),
    )?;
    if bound > 0 {
        return Err(DbError::Conflict(format!(
            "Obligation type {} is bound to {} companies",
            id, bound
        )));
    }

    let deleted = conn.execute("DELETE FROM obligation_types WHERE id = ?1", [id])?;
    if deleted == 0 {
        return Err(DbError::NotFound(format!("Obligation type {}", id)));
    }

    Ok(())
}

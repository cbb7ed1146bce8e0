use fiscal_rules::Competence;
use rusqlite::{params, Row};
use shared_types::{Annotation, CreateAnnotationRequest};

use super::bindings::require_binding;
use super::{now, AsyncDbConnection, DbError, DbResult};

fn annotation_from_row(row: &Row<'_>) -> rusqlite::Result<Annotation> {
    Ok(Annotation {
        id: row.get(0)?,
        binding_id: row.get(1)?,
        month: row.get(2)?,
        year: row.get(3)?,
        text: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Newest period first, then newest note
pub async fn list_annotations(conn: AsyncDbConnection, binding_id: i64) -> DbResult<Vec<Annotation>> {
    let conn = conn.lock().await?;
    require_binding(&conn, binding_id)?;

    let mut stmt = conn.prepare(
        "SELECT id, binding_id, month, year, text, created_at
         FROM binding_annotations
         WHERE binding_id = ?1
         ORDER BY year DESC, month DESC, created_at DESC, id DESC",
    )?;

    let annotations = stmt
        .query_map([binding_id], annotation_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(annotations)
}

pub async fn insert_annotation(
    conn: AsyncDbConnection,
    binding_id: i64,
    request: &CreateAnnotationRequest,
) -> DbResult<Annotation> {
    Competence::new(request.month, request.year).map_err(|e| DbError::Invalid(e.to_string()))?;
    let text = request.text.trim();
    if text.is_empty() {
        return Err(DbError::Invalid("text cannot be empty".to_string()));
    }

    let conn = conn.lock().await?;
    require_binding(&conn, binding_id)?;

    let annotation = conn.query_row(
        "INSERT INTO binding_annotations (binding_id, month, year, text, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING id, binding_id, month, year, text, created_at",
        params![binding_id, request.month, request.year, text, now()],
        annotation_from_row,
    )?;

    Ok(annotation)
}

pub async fn delete_annotation(conn: AsyncDbConnection, id: i64) -> DbResult<()> {
    let conn = conn.lock().await?;

    let deleted = conn.execute("DELETE FROM binding_annotations WHERE id = ?1", [id])?;
    if deleted == 0 {
        return Err(DbError::NotFound(format!("Annotation {}", id)));
    }

    Ok(())
}

use rusqlite::{params, OptionalExtension, Row};
use shared_types::TaxAnalysis;

use super::companies::require_company;
use super::{now, AsyncDbConnection, DbError, DbResult};

fn analysis_from_row(row: &Row<'_>) -> rusqlite::Result<TaxAnalysis> {
    Ok(TaxAnalysis {
        id: row.get(0)?,
        company_id: row.get(1)?,
        titulo: row.get(2)?,
        conteudo: row.get(3)?,
        modelo: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub async fn insert_analysis(
    conn: AsyncDbConnection,
    company_id: i64,
    titulo: &str,
    conteudo: &str,
    modelo: &str,
) -> DbResult<TaxAnalysis> {
    let conn = conn.lock().await?;
    require_company(&conn, company_id)?;

    let analysis = conn.query_row(
        "INSERT INTO tax_analyses (company_id, titulo, conteudo, modelo, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING id, company_id, titulo, conteudo, modelo, created_at",
        params![company_id, titulo, conteudo, modelo, now()],
        analysis_from_row,
    )?;

    Ok(analysis)
}

/// Newest first
pub async fn list_analyses(conn: AsyncDbConnection, company_id: i64) -> DbResult<Vec<TaxAnalysis>> {
    let conn = conn.lock().await?;
    require_company(&conn, company_id)?;

    let mut stmt = conn.prepare(
        "SELECT id, company_id, titulo, conteudo, modelo, created_at
         FROM tax_analyses
         WHERE company_id = ?1
         ORDER BY created_at DESC, id DESC",
    )?;
    let analyses = stmt
        .query_map([company_id], analysis_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(analyses)
}

pub async fn get_analysis(conn: AsyncDbConnection, id: i64) -> DbResult<TaxAnalysis> {
    let conn = conn.lock().await?;

    conn.query_row(
        "SELECT id, company_id, titulo, conteudo, modelo, created_at
         FROM tax_analyses WHERE id = ?1",
        [id],
        analysis_from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("Analysis {}", id)))
}

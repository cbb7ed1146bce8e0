use rusqlite::{params, Connection, OptionalExtension, Row};
use shared_types::{ChecklistFlag, ChecklistToggle, StatusChecklist, UpdateStatusRequest};
use tracing::warn;

use super::companies::require_company;
use super::{is_unique_violation, now, AsyncDbConnection, DbError, DbResult};

const STATUS_SELECT: &str = "SELECT id, company_id, integracao, analise_ncm, estudo_regime,
        levantamento_pendencias, analise_servicos, obrigacoes_acessorias, diagnostico,
        repasse, competencia, updated_at
     FROM status_checklists";

fn status_from_row(row: &Row<'_>) -> rusqlite::Result<StatusChecklist> {
    Ok(StatusChecklist {
        id: row.get(0)?,
        company_id: row.get(1)?,
        integracao: row.get(2)?,
        analise_ncm: row.get(3)?,
        estudo_regime: row.get(4)?,
        levantamento_pendencias: row.get(5)?,
        analise_servicos: row.get(6)?,
        obrigacoes_acessorias: row.get(7)?,
        diagnostico: row.get(8)?,
        repasse: row.get(9)?,
        competencia: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn find_status(conn: &Connection, id: i64) -> DbResult<StatusChecklist> {
    let sql = format!("{} WHERE id = ?1", STATUS_SELECT);
    conn.query_row(&sql, [id], status_from_row)
        .optional()?
        .ok_or_else(|| DbError::NotFound(format!("Status checklist {}", id)))
}

pub async fn list_statuses(conn: AsyncDbConnection) -> DbResult<Vec<StatusChecklist>> {
    let conn = conn.lock().await?;

    let sql = format!("{} ORDER BY company_id", STATUS_SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let statuses = stmt
        .query_map([], status_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(statuses)
}

pub async fn get_status_by_company(
    conn: AsyncDbConnection,
    company_id: i64,
) -> DbResult<StatusChecklist> {
    let conn = conn.lock().await?;

    let sql = format!("{} WHERE company_id = ?1", STATUS_SELECT);
    conn.query_row(&sql, [company_id], status_from_row)
        .optional()?
        .ok_or_else(|| DbError::NotFound(format!("Status checklist for company {}", company_id)))
}

/// One checklist per company; a second create is a conflict
pub async fn create_status(
    conn: AsyncDbConnection,
    company_id: i64,
    competencia: Option<&str>,
) -> DbResult<StatusChecklist> {
    let conn = conn.lock().await?;
    require_company(&conn, company_id)?;

    let competencia = competencia.map(str::trim).filter(|s| !s.is_empty());
    conn.query_row(
        "INSERT INTO status_checklists (company_id, competencia, updated_at)
         VALUES (?1, ?2, ?3)
         RETURNING id, company_id, integracao, analise_ncm, estudo_regime,
            levantamento_pendencias, analise_servicos, obrigacoes_acessorias, diagnostico,
            repasse, competencia, updated_at",
        params![company_id, competencia, now()],
        status_from_row,
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            DbError::Conflict(format!("Company {} already has a status checklist", company_id))
        } else {
            e.into()
        }
    })
}

fn write_flag(conn: &Connection, id: i64, flag: ChecklistFlag, value: bool, ts: i64) -> DbResult<()> {
    // Column names come from the fixed flag list, never from input
    let sql = format!(
        "UPDATE status_checklists SET {} = ?1, updated_at = ?2 WHERE id = ?3",
        flag.column()
    );
    conn.execute(&sql, params![value, ts, id])?;
    Ok(())
}

/// Write only the fields present in the request, one column per statement,
/// so concurrent updates of different flags never overwrite each other.
///
/// Each flag is persisted on its own. When one write fails, the toggles
/// already written are reverted before the error is returned.
pub async fn update_status(
    conn: AsyncDbConnection,
    id: i64,
    request: &UpdateStatusRequest,
) -> DbResult<StatusChecklist> {
    let conn = conn.lock().await?;
    let mut current = find_status(&conn, id)?;

    let ts = now();
    let mut applied: Vec<ChecklistToggle> = Vec::new();
    for mut toggle in request.toggles() {
        toggle.apply(&mut current);
        if let Err(e) = write_flag(&conn, id, toggle.flag, toggle.value, ts) {
            for done in applied.iter().rev() {
                done.revert(&mut current);
                let restored = current.flag(done.flag);
                if let Err(undo) = write_flag(&conn, id, done.flag, restored, ts) {
                    warn!(
                        "Could not revert {} on status checklist {}: {}",
                        done.flag.column(),
                        id,
                        undo
                    );
                }
            }
            return Err(e);
        }
        applied.push(toggle);
    }

    if let Some(competencia) = &request.competencia {
        let competencia = Some(competencia.trim()).filter(|s| !s.is_empty());
        conn.execute(
            "UPDATE status_checklists SET competencia = ?1, updated_at = ?2 WHERE id = ?3",
            params![competencia, ts, id],
        )?;
    }

    find_status(&conn, id)
}

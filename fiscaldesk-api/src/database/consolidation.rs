use fiscal_rules::{due_date, Competence, DueDay};
use rusqlite::params;
use shared_types::{
    AdjustPolicy, ConsolidatedObligation, ObligationCompanyStatus, ObligationStatusResponse,
};

use super::obligations::get_obligation_type;
use super::{parse_column, AsyncDbConnection, DbError, DbResult};

/// Delivered share rounded to a whole percent; 0 when nothing is bound
pub fn percentage(delivered: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (delivered as f64 / total as f64 * 100.0).round() as i64
}

/// Delivered/total per obligation type for one competence period, ordered by name
pub async fn consolidate(
    conn: AsyncDbConnection,
    month: u32,
    year: i32,
) -> DbResult<Vec<ConsolidatedObligation>> {
    Competence::new(month, year).map_err(|e| DbError::Invalid(e.to_string()))?;
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(
        "SELECT o.id, o.name, o.kind,
                COUNT(b.id) AS total_companies,
                COUNT(CASE WHEN d.delivered = 1 THEN 1 END) AS total_delivered
         FROM obligation_types o
         LEFT JOIN company_obligations b ON b.obligation_type_id = o.id
         LEFT JOIN delivery_records d
                ON d.binding_id = b.id AND d.month = ?1 AND d.year = ?2
         GROUP BY o.id, o.name, o.kind
         ORDER BY o.name, o.id",
    )?;

    let rows = stmt
        .query_map(params![month, year], |row| {
            let total_companies: i64 = row.get(3)?;
            let total_delivered: i64 = row.get(4)?;
            Ok(ConsolidatedObligation {
                obligation_type_id: row.get(0)?,
                obligation_name: row.get(1)?,
                kind: parse_column(row, 2)?,
                total_companies,
                total_delivered,
                total_pending: total_companies - total_delivered,
                percentage: percentage(total_delivered, total_companies),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Per-company breakdown of one obligation type for a competence period
pub async fn obligation_status(
    conn: AsyncDbConnection,
    obligation_type_id: i64,
    month: u32,
    year: i32,
) -> DbResult<ObligationStatusResponse> {
    let competence = Competence::new(month, year).map_err(|e| DbError::Invalid(e.to_string()))?;
    let obligation = get_obligation_type(conn.clone(), obligation_type_id).await?;

    let conn = conn.lock().await?;
    let mut stmt = conn.prepare(
        "SELECT b.id, c.id, c.razao_social, c.cnpj, b.due_day_of_month, b.adjust_policy,
                d.delivered, d.delivered_at
         FROM company_obligations b
         JOIN companies c ON c.id = b.company_id
         LEFT JOIN delivery_records d
                ON d.binding_id = b.id AND d.month = ?2 AND d.year = ?3
         WHERE b.obligation_type_id = ?1
         ORDER BY c.razao_social, b.id",
    )?;

    let raw = stmt
        .query_map(params![obligation_type_id, month, year], |row| {
            let due_day: u32 = row.get(4)?;
            let policy: AdjustPolicy = parse_column(row, 5)?;
            let delivered: Option<bool> = row.get(6)?;
            Ok((
                ObligationCompanyStatus {
                    binding_id: row.get(0)?,
                    company_id: row.get(1)?,
                    razao_social: row.get(2)?,
                    cnpj: row.get(3)?,
                    due_date: String::new(),
                    delivered: delivered.unwrap_or(false),
                    delivered_at: row.get(7)?,
                },
                due_day,
                policy,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut companies = Vec::with_capacity(raw.len());
    for (mut status, due_day, policy) in raw {
        let due_day = DueDay::new(due_day).map_err(|e| DbError::Invalid(e.to_string()))?;
        status.due_date = due_date(due_day, policy, competence)
            .format("%Y-%m-%d")
            .to_string();
        companies.push(status);
    }

    let total_companies = companies.len() as i64;
    let total_delivered = companies.iter().filter(|c| c.delivered).count() as i64;

    Ok(ObligationStatusResponse {
        obligation,
        mes: month,
        ano: year,
        total_companies,
        total_delivered,
        percentage: percentage(total_delivered, total_companies),
        companies,
    })
}

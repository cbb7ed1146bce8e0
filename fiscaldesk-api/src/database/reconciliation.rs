use rusqlite::{params, Connection, Row};
use shared_types::ReconciliationIssue;

use super::{now, AsyncDbConnection, DbResult};

fn issue_from_row(row: &Row<'_>) -> rusqlite::Result<ReconciliationIssue> {
    Ok(ReconciliationIssue {
        id: row.get(0)?,
        resource: row.get(1)?,
        resource_id: row.get(2)?,
        operation: row.get(3)?,
        error: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Record a side effect that failed after its row was already gone
pub(crate) fn record_issue(
    conn: &Connection,
    resource: &str,
    resource_id: &str,
    operation: &str,
    error: &str,
) -> DbResult<ReconciliationIssue> {
    let issue = conn.query_row(
        "INSERT INTO reconciliation_issues (resource, resource_id, operation, error, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING id, resource, resource_id, operation, error, created_at",
        params![resource, resource_id, operation, error, now()],
        issue_from_row,
    )?;

    tracing::warn!(
        "Recorded reconciliation issue {}: {} {} {} failed: {}",
        issue.id,
        resource,
        resource_id,
        operation,
        error
    );

    Ok(issue)
}

pub async fn list_issues(conn: AsyncDbConnection) -> DbResult<Vec<ReconciliationIssue>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(
        "SELECT id, resource, resource_id, operation, error, created_at
         FROM reconciliation_issues
         ORDER BY created_at DESC, id DESC",
    )?;

    let issues = stmt
        .query_map([], issue_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(issues)
}

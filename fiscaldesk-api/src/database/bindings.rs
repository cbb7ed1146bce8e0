use fiscal_rules::DueDay;
use rusqlite::{params, Connection, OptionalExtension, Row};
use shared_types::{
    Attachment, CompanyObligation, CompanyObligationInput, ObligationKind, RemovalReport,
};
use tracing::{info, warn};

use super::attachments::binding_attachments;
use super::reconciliation::record_issue;
use super::{is_unique_violation, parse_column, AsyncDbConnection, DbError, DbResult};
use crate::helpers::file_store::FileStore;

const BINDING_SELECT: &str = "SELECT b.id, b.company_id, b.obligation_type_id, o.name, o.kind,
        b.due_day_of_month, b.adjust_policy, b.rate_or_notes
     FROM company_obligations b
     JOIN obligation_types o ON o.id = b.obligation_type_id";

fn binding_from_row(row: &Row<'_>) -> rusqlite::Result<CompanyObligation> {
    Ok(CompanyObligation {
        id: row.get(0)?,
        company_id: row.get(1)?,
        obligation_type_id: row.get(2)?,
        obligation_name: row.get(3)?,
        kind: parse_column(row, 4)?,
        due_day_of_month: row.get(5)?,
        adjust_policy: parse_column(row, 6)?,
        rate_or_notes: row.get(7)?,
    })
}

pub(crate) fn find_binding(conn: &Connection, id: i64) -> DbResult<Option<CompanyObligation>> {
    let sql = format!("{} WHERE b.id = ?1", BINDING_SELECT);
    Ok(conn.query_row(&sql, [id], binding_from_row).optional()?)
}

pub(crate) fn require_binding(conn: &Connection, id: i64) -> DbResult<CompanyObligation> {
    find_binding(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Binding {}", id)))
}

pub(crate) fn company_bindings(
    conn: &Connection,
    company_id: i64,
) -> DbResult<Vec<CompanyObligation>> {
    let sql = format!("{} WHERE b.company_id = ?1 ORDER BY o.name, b.id", BINDING_SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let bindings = stmt
        .query_map([company_id], binding_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(bindings)
}

/// Update the binding named by `input.id`, or insert/update the one for
/// (company, obligation type) in one statement when no id is given
pub(crate) fn upsert_binding(
    conn: &Connection,
    company_id: i64,
    input: &CompanyObligationInput,
) -> DbResult<CompanyObligation> {
    let due_day =
        DueDay::new(input.due_day_of_month).map_err(|e| DbError::Invalid(e.to_string()))?;

    let kind: Option<ObligationKind> = conn
        .query_row(
            "SELECT kind FROM obligation_types WHERE id = ?1",
            [input.obligation_type_id],
            |row| parse_column(row, 0),
        )
        .optional()?;
    let kind = kind.ok_or_else(|| {
        DbError::Invalid(format!("Unknown obligation type {}", input.obligation_type_id))
    })?;

    let rate_or_notes = input
        .rate_or_notes
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if rate_or_notes.is_some() && kind != ObligationKind::Principal {
        return Err(DbError::Invalid(
            "rateOrNotes only applies to principal obligations".to_string(),
        ));
    }

    let (day, policy) = (due_day.get(), input.adjust_policy.as_str());
    let id: i64 = match input.id {
        Some(id) => conn
            .query_row(
                "UPDATE company_obligations SET obligation_type_id = ?1, due_day_of_month = ?2,
                    adjust_policy = ?3, rate_or_notes = ?4
                 WHERE id = ?5 AND company_id = ?6
                 RETURNING id",
                params![
                    input.obligation_type_id,
                    day,
                    policy,
                    rate_or_notes,
                    id,
                    company_id
                ],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DbError::Conflict(format!(
                        "Company {} already has a binding for obligation type {}",
                        company_id, input.obligation_type_id
                    ))
                } else {
                    e.into()
                }
            })?
            .ok_or_else(|| DbError::NotFound(format!("Binding {}", id)))?,
        None => conn.query_row(
            "INSERT INTO company_obligations
                (company_id, obligation_type_id, due_day_of_month, adjust_policy, rate_or_notes)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (company_id, obligation_type_id) DO UPDATE SET
                due_day_of_month = excluded.due_day_of_month,
                adjust_policy = excluded.adjust_policy,
                rate_or_notes = excluded.rate_or_notes
             RETURNING id",
            params![company_id, input.obligation_type_id, day, policy, rate_or_notes],
            |row| row.get(0),
        )?,
    };

    require_binding(conn, id)
}

pub async fn get_binding(conn: AsyncDbConnection, id: i64) -> DbResult<CompanyObligation> {
    let conn = conn.lock().await?;
    require_binding(&conn, id)
}

/// Deletes a binding together with everything that hangs off it
#[derive(Debug)]
pub struct BindingRemoval {
    pub binding_id: i64,
    pub annotations: usize,
    pub attachments: Vec<Attachment>,
    pub deliveries: usize,
}

impl BindingRemoval {
    pub fn plan(conn: &Connection, binding_id: i64) -> DbResult<Self> {
        require_binding(conn, binding_id)?;

        let count = |table: &str| -> DbResult<usize> {
            let sql = format!("SELECT COUNT(*) FROM {} WHERE binding_id = ?1", table);
            let n: i64 = conn.query_row(&sql, [binding_id], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(Self {
            binding_id,
            annotations: count("binding_annotations")?,
            attachments: binding_attachments(conn, binding_id)?,
            deliveries: count("delivery_records")?,
        })
    }

    /// Order: annotations, attachments (store first, then row), deliveries, binding.
    /// A failed store delete is recorded and the row is removed anyway.
    pub fn execute(self, conn: &Connection, store: &dyn FileStore) -> DbResult<RemovalReport> {
        let mut report = RemovalReport::default();

        report.annotations = conn.execute(
            "DELETE FROM binding_annotations WHERE binding_id = ?1",
            [self.binding_id],
        )?;

        for attachment in &self.attachments {
            if let Err(e) = store.delete(&attachment.storage_key) {
                warn!(
                    "Failed to delete stored file {} for attachment {}: {}",
                    attachment.storage_key, attachment.id, e
                );
                let issue = record_issue(
                    conn,
                    "attachment",
                    &attachment.storage_key,
                    "file_delete",
                    &e.to_string(),
                )?;
                report.issues.push(issue);
            }
            conn.execute(
                "DELETE FROM binding_attachments WHERE id = ?1",
                [attachment.id],
            )?;
            report.attachments += 1;
        }

        report.deliveries = conn.execute(
            "DELETE FROM delivery_records WHERE binding_id = ?1",
            [self.binding_id],
        )?;

        report.bindings = conn.execute(
            "DELETE FROM company_obligations WHERE id = ?1",
            [self.binding_id],
        )?;

        info!(
            "Removed binding {}: {} annotations, {} attachments, {} deliveries, {} issues",
            self.binding_id,
            report.annotations,
            report.attachments,
            report.deliveries,
            report.issues.len()
        );

        Ok(report)
    }
}

pub(crate) fn remove_binding(
    conn: &Connection,
    store: &dyn FileStore,
    binding_id: i64,
) -> DbResult<RemovalReport> {
    BindingRemoval::plan(conn, binding_id)?.execute(conn, store)
}

pub async fn delete_binding(
    conn: AsyncDbConnection,
    store: &dyn FileStore,
    binding_id: i64,
) -> DbResult<RemovalReport> {
    let mut conn = conn.lock().await?;
    let tx = conn.transaction()?;
    let report = remove_binding(&tx, store, binding_id)?;
    tx.commit()?;
    Ok(report)
}

use rusqlite::{params, Connection, OptionalExtension, Row};
use shared_types::{Attachment, CreateAttachmentRequest, RemovalReport};

use super::bindings::require_binding;
use super::reconciliation::record_issue;
use super::{now, AsyncDbConnection, DbError, DbResult};
use crate::helpers::file_store::FileStore;

const ATTACHMENT_SELECT: &str =
    "SELECT id, binding_id, file_name, storage_key, content_type, created_at FROM binding_attachments";

fn attachment_from_row(row: &Row<'_>) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: row.get(0)?,
        binding_id: row.get(1)?,
        file_name: row.get(2)?,
        storage_key: row.get(3)?,
        content_type: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub(crate) fn binding_attachments(conn: &Connection, binding_id: i64) -> DbResult<Vec<Attachment>> {
    let sql = format!("{} WHERE binding_id = ?1 ORDER BY created_at DESC, id DESC", ATTACHMENT_SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let attachments = stmt
        .query_map([binding_id], attachment_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(attachments)
}

/// Storage key for a new file: `bindings/<binding>/<uuid>-<sanitized name>`
fn generate_storage_key(binding_id: i64, file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("bindings/{}/{}-{}", binding_id, uuid::Uuid::new_v4(), safe)
}

/// A caller-supplied key must sit under the binding's own prefix with no
/// `.`/`..` segments, so deleting the attachment never reaches another binding's files
fn check_storage_key(binding_id: i64, key: &str) -> DbResult<()> {
    let prefix = format!("bindings/{}/", binding_id);
    let owned = key
        .strip_prefix(&prefix)
        .is_some_and(|rest| rest.split('/').all(|seg| !seg.is_empty() && seg != "." && seg != ".."));
    if owned {
        Ok(())
    } else {
        Err(DbError::Invalid(format!(
            "storageKey must start with {} and name a file below it",
            prefix
        )))
    }
}

pub async fn list_attachments(conn: AsyncDbConnection, binding_id: i64) -> DbResult<Vec<Attachment>> {
    let conn = conn.lock().await?;
    require_binding(&conn, binding_id)?;
    binding_attachments(&conn, binding_id)
}

/// Register metadata for a file already placed in the store
pub async fn insert_attachment(
    conn: AsyncDbConnection,
    binding_id: i64,
    request: &CreateAttachmentRequest,
) -> DbResult<Attachment> {
    let file_name = request.file_name.trim();
    if file_name.is_empty() {
        return Err(DbError::Invalid("fileName cannot be empty".to_string()));
    }

    let conn = conn.lock().await?;
    require_binding(&conn, binding_id)?;

    let storage_key = match request.storage_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            check_storage_key(binding_id, key)?;
            key.to_string()
        }
        _ => generate_storage_key(binding_id, file_name),
    };

    let attachment = conn.query_row(
        "INSERT INTO binding_attachments (binding_id, file_name, storage_key, content_type, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING id, binding_id, file_name, storage_key, content_type, created_at",
        params![binding_id, file_name, storage_key, request.content_type, now()],
        attachment_from_row,
    )?;

    Ok(attachment)
}

/// Delete the stored file, then the row. A store failure is recorded, not returned.
pub async fn delete_attachment(
    conn: AsyncDbConnection,
    store: &dyn FileStore,
    id: i64,
) -> DbResult<RemovalReport> {
    let conn = conn.lock().await?;

    let sql = format!("{} WHERE id = ?1", ATTACHMENT_SELECT);
    let attachment = conn
        .query_row(&sql, [id], attachment_from_row)
        .optional()?
        .ok_or_else(|| DbError::NotFound(format!("Attachment {}", id)))?;

    let mut report = RemovalReport::default();
    if let Err(e) = store.delete(&attachment.storage_key) {
        tracing::warn!("Failed to delete stored file {}: {}", attachment.storage_key, e);
        report.issues.push(record_issue(
            &conn,
            "attachment",
            &attachment.storage_key,
            "file_delete",
            &e.to_string(),
        )?);
    }

    report.attachments = conn.execute("DELETE FROM binding_attachments WHERE id = ?1", [id])?;
    Ok(report)
}

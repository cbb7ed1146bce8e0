use fiscal_rules::Competence;
use rusqlite::{params, Row};
use shared_types::DeliveryRecord;

use super::bindings::require_binding;
use super::{now, AsyncDbConnection, DbError, DbResult};

fn delivery_from_row(row: &Row<'_>) -> rusqlite::Result<DeliveryRecord> {
    Ok(DeliveryRecord {
        id: row.get(0)?,
        binding_id: row.get(1)?,
        month: row.get(2)?,
        year: row.get(3)?,
        delivered: row.get(4)?,
        delivered_at: row.get(5)?,
    })
}

/// Mark a competence period delivered or pending.
///
/// One statement keyed on (binding, month, year): concurrent calls for the same
/// period never create a second row. `delivered_at` is set to now when delivered
/// (refreshed on every re-delivery) and cleared otherwise.
pub async fn record_delivery(
    conn: AsyncDbConnection,
    binding_id: i64,
    month: u32,
    year: i32,
    delivered: bool,
) -> DbResult<DeliveryRecord> {
    Competence::new(month, year).map_err(|e| DbError::Invalid(e.to_string()))?;

    let conn = conn.lock().await?;
    require_binding(&conn, binding_id)?;

    let delivered_at = delivered.then(now);

    let record = conn.query_row(
        "INSERT INTO delivery_records (binding_id, month, year, delivered, delivered_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (binding_id, month, year) DO UPDATE SET
            delivered = excluded.delivered,
            delivered_at = excluded.delivered_at
         RETURNING id, binding_id, month, year, delivered, delivered_at",
        params![binding_id, month, year, delivered, delivered_at],
        delivery_from_row,
    )?;

    tracing::debug!(
        "Recorded delivery for binding {} {:02}/{}: delivered={}",
        binding_id,
        month,
        year,
        delivered
    );

    Ok(record)
}

pub async fn query_deliveries(
    conn: AsyncDbConnection,
    binding_id: i64,
) -> DbResult<Vec<DeliveryRecord>> {
    let conn = conn.lock().await?;
    require_binding(&conn, binding_id)?;

    let mut stmt = conn.prepare(
        "SELECT id, binding_id, month, year, delivered, delivered_at
         FROM delivery_records
         WHERE binding_id = ?1
         ORDER BY year DESC, month DESC",
    )?;

    let records = stmt
        .query_map([binding_id], delivery_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::bindings::tests::seed_binding;
    use crate::database::test_support::test_db;
    use shared_types::ObligationKind;

    #[tokio::test]
    async fn test_recording_twice_keeps_one_row() {
        let (_dir, db) = test_db();
        let (_, binding_id) = seed_binding(&db, "11222333000181", ObligationKind::Accessory);

        let first = record_delivery(db.async_connection.clone(), binding_id, 3, 2024, true)
            .await
            .unwrap();
        let second = record_delivery(db.async_connection.clone(), binding_id, 3, 2024, true)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.delivered);
        assert!(second.delivered_at.is_some());

        let all = query_deliveries(db.async_connection.clone(), binding_id)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_delivered_at_follows_delivered_flag() {
        let (_dir, db) = test_db();
        let (_, binding_id) = seed_binding(&db, "11222333000181", ObligationKind::Accessory);

        let sequence = [true, false, true, false];
        for delivered in sequence {
            let record = record_delivery(db.async_connection.clone(), binding_id, 7, 2024, delivered)
                .await
                .unwrap();
            assert_eq!(record.delivered, delivered);
            assert_eq!(record.delivered_at.is_some(), delivered);
        }
    }

    #[tokio::test]
    async fn test_deliveries_ordered_newest_period_first() {
        let (_dir, db) = test_db();
        let (_, binding_id) = seed_binding(&db, "11222333000181", ObligationKind::Accessory);

        for (month, year) in [(12, 2023), (1, 2024), (11, 2023), (2, 2024)] {
            record_delivery(db.async_connection.clone(), binding_id, month, year, true)
                .await
                .unwrap();
        }

        let periods: Vec<_> = query_deliveries(db.async_connection.clone(), binding_id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| (r.month, r.year))
            .collect();
        assert_eq!(periods, vec![(2, 2024), (1, 2024), (12, 2023), (11, 2023)]);
    }

    #[tokio::test]
    async fn test_rejects_bad_month_and_unknown_binding() {
        let (_dir, db) = test_db();
        let (_, binding_id) = seed_binding(&db, "11222333000181", ObligationKind::Accessory);

        let bad_month = record_delivery(db.async_connection.clone(), binding_id, 0, 2024, true).await;
        assert!(matches!(bad_month, Err(DbError::Invalid(_))));

        let missing = record_delivery(db.async_connection.clone(), 999, 3, 2024, true).await;
        assert!(matches!(missing, Err(DbError::NotFound(_))));
    }
}

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use shared_types::{DeliveriesResponse, RecordDeliveryRequest};
use std::sync::Arc;
use tracing::info;

use super::error::ApiError;
use crate::database::deliveries as db;
use crate::database::Database;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveriesQuery {
    pub binding_id: Option<i64>,
}

pub async fn list_deliveries(
    database: web::Data<Arc<Database>>,
    query: web::Query<DeliveriesQuery>,
) -> Result<HttpResponse, ApiError> {
    let binding_id = query
        .binding_id
        .ok_or_else(|| ApiError::MissingFields(vec!["bindingId".to_string()]))?;

    let deliveries = db::query_deliveries(database.async_connection.clone(), binding_id).await?;

    Ok(HttpResponse::Ok().json(DeliveriesResponse { deliveries }))
}

/// Upsert on (binding, month, year)
pub async fn record_delivery(
    database: web::Data<Arc<Database>>,
    request: web::Json<RecordDeliveryRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = request.into_inner();

    let record = db::record_delivery(
        database.async_connection.clone(),
        req.binding_id,
        req.month,
        req.year,
        req.delivered,
    )
    .await?;
    info!(
        "Binding {} {}/{} marked {}",
        record.binding_id,
        record.month,
        record.year,
        if record.delivered { "delivered" } else { "pending" }
    );

    Ok(HttpResponse::Ok().json(record))
}

use actix_web::{web, HttpResponse};
use chrono::Datelike;
use serde::Deserialize;
use shared_types::{
    ConsolidationResponse, CreateObligationTypeRequest, ObligationKind, ObligationTypesResponse,
};
use std::sync::Arc;
use tracing::info;

use super::error::ApiError;
use crate::database::{consolidation, obligations as db, Database};

#[derive(Debug, Deserialize)]
pub struct ListObligationsQuery {
    pub kind: Option<ObligationKind>,
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub mes: Option<u32>,
    pub ano: Option<i32>,
}

pub async fn list_obligations(
    database: web::Data<Arc<Database>>,
    query: web::Query<ListObligationsQuery>,
) -> Result<HttpResponse, ApiError> {
    let obligations = db::list_obligation_types(database.async_connection.clone(), query.kind).await?;

    Ok(HttpResponse::Ok().json(ObligationTypesResponse { obligations }))
}

pub async fn create_obligation(
    database: web::Data<Arc<Database>>,
    request: web::Json<CreateObligationTypeRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = request.into_inner();

    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    let mut missing = Vec::new();
    if name.is_empty() {
        missing.push("name".to_string());
    }
    if req.kind.is_none() {
        missing.push("kind".to_string());
    }
    let Some(kind) = req.kind.filter(|_| missing.is_empty()) else {
        return Err(ApiError::MissingFields(missing));
    };

    let obligation = db::insert_obligation_type(database.async_connection.clone(), name, kind).await?;
    info!("Added {} obligation type {}", kind, obligation.name);

    Ok(HttpResponse::Created().json(obligation))
}

pub async fn delete_obligation(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    db::delete_obligation_type(database.async_connection.clone(), path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Rollup for `mes`/`ano`, defaulting to the current month
pub async fn consolidated(
    database: web::Data<Arc<Database>>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, ApiError> {
    let today = chrono::Local::now().date_naive();
    let mes = query.mes.unwrap_or_else(|| today.month());
    let ano = query.ano.unwrap_or_else(|| today.year());

    let obligations = consolidation::consolidate(database.async_connection.clone(), mes, ano).await?;

    Ok(HttpResponse::Ok().json(ConsolidationResponse {
        mes,
        ano,
        obligations,
    }))
}

pub async fn obligation_status(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, ApiError> {
    let (Some(mes), Some(ano)) = (query.mes, query.ano) else {
        return Err(ApiError::Validation(
            "Query parameters mes and ano are required".to_string(),
        ));
    };

    let status =
        consolidation::obligation_status(database.async_connection.clone(), path.into_inner(), mes, ano)
            .await?;

    Ok(HttpResponse::Ok().json(status))
}

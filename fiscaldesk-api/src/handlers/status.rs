use actix_web::{web, HttpResponse};
use shared_types::{CreateStatusRequest, StatusChecklistsResponse, UpdateStatusRequest};
use std::sync::Arc;

use super::error::ApiError;
use crate::database::status_checklists as db;
use crate::database::Database;

pub async fn list_statuses(database: web::Data<Arc<Database>>) -> Result<HttpResponse, ApiError> {
    let statuses = db::list_statuses(database.async_connection.clone()).await?;

    Ok(HttpResponse::Ok().json(StatusChecklistsResponse { statuses }))
}

pub async fn get_status_by_company(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let status = db::get_status_by_company(database.async_connection.clone(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(status))
}

pub async fn create_status(
    database: web::Data<Arc<Database>>,
    request: web::Json<CreateStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    let company_id = request
        .company_id
        .ok_or_else(|| ApiError::MissingFields(vec!["companyId".to_string()]))?;

    let status = db::create_status(
        database.async_connection.clone(),
        company_id,
        request.competencia.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Created().json(status))
}

pub async fn update_status(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
    request: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    let status = db::update_status(database.async_connection.clone(), path.into_inner(), &request).await?;

    Ok(HttpResponse::Ok().json(status))
}

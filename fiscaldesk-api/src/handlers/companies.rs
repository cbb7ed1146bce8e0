use actix_web::{web, HttpResponse};
use shared_types::{CompaniesResponse, CreateCompanyRequest, UpdateCompanyRequest};
use std::sync::Arc;
use tracing::info;

use super::error::ApiError;
use crate::database::companies as db;
use crate::database::Database;
use crate::helpers::file_store::FileStore;

pub async fn list_companies(database: web::Data<Arc<Database>>) -> Result<HttpResponse, ApiError> {
    let companies = db::list_companies(database.async_connection.clone()).await?;

    Ok(HttpResponse::Ok().json(CompaniesResponse { companies }))
}

pub async fn get_company(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let detail = db::get_company_detail(database.async_connection.clone(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(detail))
}

pub async fn create_company(
    database: web::Data<Arc<Database>>,
    request: web::Json<CreateCompanyRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = request.into_inner();

    let missing = req.missing_fields();
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }

    let detail = db::insert_company(database.async_connection.clone(), &req).await?;

    Ok(HttpResponse::Created().json(detail))
}

pub async fn update_company(
    database: web::Data<Arc<Database>>,
    store: web::Data<Arc<dyn FileStore>>,
    path: web::Path<i64>,
    request: web::Json<UpdateCompanyRequest>,
) -> Result<HttpResponse, ApiError> {
    let company_id = path.into_inner();

    let (detail, report) = db::update_company(
        database.async_connection.clone(),
        store.get_ref().as_ref(),
        company_id,
        &request.into_inner(),
    )
    .await?;

    if report.bindings > 0 {
        info!(
            "Company {} update removed {} bindings ({} issues)",
            company_id,
            report.bindings,
            report.issues.len()
        );
    }

    Ok(HttpResponse::Ok().json(detail))
}

pub async fn delete_company(
    database: web::Data<Arc<Database>>,
    store: web::Data<Arc<dyn FileStore>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let company_id = path.into_inner();

    let report = db::delete_company(
        database.async_connection.clone(),
        store.get_ref().as_ref(),
        company_id,
    )
    .await?;
    info!("Deleted company {}", company_id);

    Ok(HttpResponse::Ok().json(report))
}

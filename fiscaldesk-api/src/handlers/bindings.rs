use actix_web::{web, HttpResponse};
use chrono::Datelike;
use fiscal_rules::{annual_schedule, DueDay};
use serde::Deserialize;
use shared_types::{
    AnnotationsResponse, AttachmentsResponse, CreateAnnotationRequest, CreateAttachmentRequest,
    ReconciliationIssuesResponse, Vencimento, VencimentosResponse,
};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::ApiError;
use crate::database::{annotations, attachments, bindings as db, reconciliation, Database};
use crate::helpers::file_store::FileStore;

#[derive(Debug, Deserialize)]
pub struct VencimentosQuery {
    pub ano: Option<i32>,
}

pub async fn get_binding(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let binding = db::get_binding(database.async_connection.clone(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(binding))
}

/// Removes the binding with its annotations, attachments and deliveries
pub async fn delete_binding(
    database: web::Data<Arc<Database>>,
    store: web::Data<Arc<dyn FileStore>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let binding_id = path.into_inner();

    let report = db::delete_binding(
        database.async_connection.clone(),
        store.get_ref().as_ref(),
        binding_id,
    )
    .await?;

    if report.is_clean() {
        info!("Deleted binding {}", binding_id);
    } else {
        warn!(
            "Deleted binding {} with {} reconciliation issues",
            binding_id,
            report.issues.len()
        );
    }

    Ok(HttpResponse::Ok().json(report))
}

pub async fn vencimentos(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
    query: web::Query<VencimentosQuery>,
) -> Result<HttpResponse, ApiError> {
    let binding = db::get_binding(database.async_connection.clone(), path.into_inner()).await?;
    let ano = query
        .ano
        .unwrap_or_else(|| chrono::Local::now().date_naive().year());

    let due_day = DueDay::new(binding.due_day_of_month)?;
    let vencimentos = annual_schedule(due_day, binding.adjust_policy, ano)?
        .into_iter()
        .map(|(competence, date)| Vencimento {
            mes: competence.month(),
            ano: competence.year(),
            due_date: date.format("%Y-%m-%d").to_string(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(VencimentosResponse {
        binding_id: binding.id,
        ano,
        vencimentos,
    }))
}

pub async fn list_annotations(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let annotations =
        annotations::list_annotations(database.async_connection.clone(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(AnnotationsResponse { annotations }))
}

pub async fn create_annotation(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
    request: web::Json<CreateAnnotationRequest>,
) -> Result<HttpResponse, ApiError> {
    let annotation =
        annotations::insert_annotation(database.async_connection.clone(), path.into_inner(), &request)
            .await?;

    Ok(HttpResponse::Created().json(annotation))
}

pub async fn delete_annotation(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    annotations::delete_annotation(database.async_connection.clone(), path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

pub async fn list_attachments(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let attachments =
        attachments::list_attachments(database.async_connection.clone(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(AttachmentsResponse { attachments }))
}

pub async fn create_attachment(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
    request: web::Json<CreateAttachmentRequest>,
) -> Result<HttpResponse, ApiError> {
    let attachment =
        attachments::insert_attachment(database.async_connection.clone(), path.into_inner(), &request)
            .await?;

    Ok(HttpResponse::Created().json(attachment))
}

pub async fn delete_attachment(
    database: web::Data<Arc<Database>>,
    store: web::Data<Arc<dyn FileStore>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let report = attachments::delete_attachment(
        database.async_connection.clone(),
        store.get_ref().as_ref(),
        path.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(report))
}

pub async fn list_reconciliation_issues(
    database: web::Data<Arc<Database>>,
) -> Result<HttpResponse, ApiError> {
    let issues = reconciliation::list_issues(database.async_connection.clone()).await?;

    Ok(HttpResponse::Ok().json(ReconciliationIssuesResponse { issues }))
}

use actix_web::{web, HttpResponse};
use fiscal_rules::{validate_ncm, NcmCatalog};
use shared_types::NcmAnalysisRequest;
use std::sync::Arc;

use super::error::ApiError;

pub async fn analise_ncm(
    catalog: web::Data<Arc<NcmCatalog>>,
    request: web::Json<NcmAnalysisRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = request.into_inner();

    let ncm = req.ncm.filter(|v| !v.trim().is_empty());
    let descricao = req.descricao.filter(|v| !v.trim().is_empty());

    let (Some(ncm), Some(descricao)) = (ncm.as_deref(), descricao.as_deref()) else {
        let mut missing = Vec::new();
        if ncm.is_none() {
            missing.push("ncm".to_string());
        }
        if descricao.is_none() {
            missing.push("descricao".to_string());
        }
        return Err(ApiError::MissingFields(missing));
    };

    Ok(HttpResponse::Ok().json(validate_ncm(&catalog, ncm, descricao.trim())))
}

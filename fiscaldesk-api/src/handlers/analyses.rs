use actix_web::{web, HttpResponse};
use fiscaldesk_agents::AnalysisContext;
use shared_types::{CompanyDetail, CreateAnalysisRequest, TaxAnalysesResponse};
use std::sync::Arc;
use tracing::info;

use super::error::ApiError;
use crate::database::{analyses as db, companies, Database};
use crate::helpers::agents::AgentServices;

fn analysis_context(detail: &CompanyDetail, pergunta: Option<String>) -> AnalysisContext {
    let obrigacoes = detail
        .obrigacoes_principais
        .iter()
        .chain(&detail.obrigacoes_acessorias)
        .map(|b| match &b.rate_or_notes {
            Some(notes) => format!(
                "{} ({}, dia {}, {})",
                b.obligation_name, b.kind, b.due_day_of_month, notes
            ),
            None => format!("{} ({}, dia {})", b.obligation_name, b.kind, b.due_day_of_month),
        })
        .collect();

    let parcelamentos = detail
        .parcelamentos
        .iter()
        .map(|p| format!("{} ({}/{})", p.descricao, p.parcela_atual, p.total_parcelas))
        .collect();

    AnalysisContext {
        razao_social: detail.company.razao_social.clone(),
        cnpj: detail.company.cnpj.clone(),
        regime_tributacao: detail.company.regime_tributacao.clone(),
        uf: detail.company.uf.clone(),
        obrigacoes,
        parcelamentos,
        pergunta,
    }
}

pub async fn create_analysis(
    database: web::Data<Arc<Database>>,
    agents: web::Data<Arc<AgentServices>>,
    path: web::Path<i64>,
    request: Option<web::Json<CreateAnalysisRequest>>,
) -> Result<HttpResponse, ApiError> {
    let company_id = path.into_inner();
    let req = request.map(web::Json::into_inner).unwrap_or_default();

    let detail = companies::get_company_detail(database.async_connection.clone(), company_id).await?;
    let completion = agents
        .analyst()?
        .analyze(&analysis_context(&detail, req.pergunta))
        .await?;

    let titulo = req
        .titulo
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| format!("Análise tributária - {}", detail.company.razao_social));

    let analysis = db::insert_analysis(
        database.async_connection.clone(),
        company_id,
        titulo.trim(),
        &completion.text,
        &completion.model,
    )
    .await?;
    info!("Stored analysis {} for company {}", analysis.id, company_id);

    Ok(HttpResponse::Created().json(analysis))
}

pub async fn list_analyses(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let analyses = db::list_analyses(database.async_connection.clone(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(TaxAnalysesResponse { analyses }))
}

pub async fn get_analysis(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let analysis = db::get_analysis(database.async_connection.clone(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(analysis))
}

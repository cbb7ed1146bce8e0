use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// LLM-written tax analysis stored for a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxAnalysis {
    pub id: i64,
    pub company_id: i64,
    pub titulo: String,
    pub conteudo: String,
    pub modelo: String,
    pub created_at: i64,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnalysisRequest {
    pub titulo: Option<String>,
    /// Extra question appended to the company context
    pub pergunta: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxAnalysesResponse {
    pub analyses: Vec<TaxAnalysis>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NcmAnalysisRequest {
    pub ncm: Option<String>,
    pub descricao: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NcmStatus {
    Correct,
    Incorrect,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NcmSuggestion {
    pub ncm: String,
    pub descricao: String,
    pub similaridade: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NcmAnalysisResponse {
    pub ncm: String,
    pub descricao: String,
    pub status: NcmStatus,
    pub confianca: f64,
    /// Catalog description of the submitted code, when known
    pub descricao_oficial: Option<String>,
    pub sugestoes: Vec<NcmSuggestion>,
}

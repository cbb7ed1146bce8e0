use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::obligation::{CompanyObligation, CompanyObligationInput};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: i64,
    pub razao_social: String,
    pub nome_fantasia: Option<String>,
    pub cnpj: String,
    pub regime_tributacao: String,
    pub usuario_id: i64,
    pub uf: String,
    pub municipio: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Company with its obligations split by kind and its installment plans
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub obrigacoes_acessorias: Vec<CompanyObligation>,
    pub obrigacoes_principais: Vec<CompanyObligation>,
    pub parcelamentos: Vec<Parcelamento>,
}

/// Tax debt installment plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Parcelamento {
    pub id: i64,
    pub company_id: i64,
    pub descricao: String,
    pub total_parcelas: u32,
    pub parcela_atual: u32,
    pub valor_parcela: Option<f64>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ParcelamentoInput {
    pub id: Option<i64>,
    pub descricao: String,
    pub total_parcelas: u32,
    #[serde(default)]
    pub parcela_atual: u32,
    pub valor_parcela: Option<f64>,
    pub observacoes: Option<String>,
}

/// Every scalar is optional so validation can report all missing fields at once
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    pub razao_social: Option<String>,
    pub nome_fantasia: Option<String>,
    pub cnpj: Option<String>,
    pub regime_tributacao: Option<String>,
    pub usuario_id: Option<i64>,
    pub uf: Option<String>,
    pub municipio: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    #[serde(default)]
    pub obrigacoes: Vec<CompanyObligationInput>,
    #[serde(default)]
    pub parcelamentos: Vec<ParcelamentoInput>,
}

impl CreateCompanyRequest {
    /// Names of required fields that are absent or blank, in wire spelling
    pub fn missing_fields(&self) -> Vec<String> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());

        let mut missing = Vec::new();
        if blank(&self.razao_social) {
            missing.push("razaoSocial".to_string());
        }
        if blank(&self.cnpj) {
            missing.push("cnpj".to_string());
        }
        if blank(&self.regime_tributacao) {
            missing.push("regimeTributacao".to_string());
        }
        if self.usuario_id.is_none() {
            missing.push("usuarioId".to_string());
        }
        if blank(&self.uf) {
            missing.push("uf".to_string());
        }
        missing
    }
}

/// Partial update; an absent array leaves that collection untouched
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    pub razao_social: Option<String>,
    pub nome_fantasia: Option<String>,
    pub cnpj: Option<String>,
    pub regime_tributacao: Option<String>,
    pub uf: Option<String>,
    pub municipio: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub obrigacoes: Option<Vec<CompanyObligationInput>>,
    pub parcelamentos: Option<Vec<ParcelamentoInput>>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CompaniesResponse {
    pub companies: Vec<Company>,
}

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ParseEnumError;

/// Accessory obligations are informational filings, principal ones are payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ObligationKind {
    Accessory,
    Principal,
}

impl ObligationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObligationKind::Accessory => "accessory",
            ObligationKind::Principal => "principal",
        }
    }
}

impl std::fmt::Display for ObligationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ObligationKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accessory" => Ok(ObligationKind::Accessory),
            "principal" => Ok(ObligationKind::Principal),
            other => Err(ParseEnumError::new("ObligationKind", other)),
        }
    }
}

/// What to do when a due date lands on a weekend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AdjustPolicy {
    /// Move back to the previous Friday
    Anticipate,
    /// Move forward to the next Monday
    Postpone,
}

impl AdjustPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustPolicy::Anticipate => "anticipate",
            AdjustPolicy::Postpone => "postpone",
        }
    }
}

impl Default for AdjustPolicy {
    fn default() -> Self {
        AdjustPolicy::Postpone
    }
}

impl std::fmt::Display for AdjustPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AdjustPolicy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anticipate" => Ok(AdjustPolicy::Anticipate),
            "postpone" => Ok(AdjustPolicy::Postpone),
            other => Err(ParseEnumError::new("AdjustPolicy", other)),
        }
    }
}

/// Catalog entry for a recurring tax obligation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ObligationType {
    pub id: i64,
    pub name: String,
    pub kind: ObligationKind,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateObligationTypeRequest {
    pub name: Option<String>,
    pub kind: Option<ObligationKind>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ObligationTypesResponse {
    pub obligations: Vec<ObligationType>,
}

/// A company's subscription to an obligation type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CompanyObligation {
    pub id: i64,
    pub company_id: i64,
    pub obligation_type_id: i64,
    pub obligation_name: String,
    pub kind: ObligationKind,
    pub due_day_of_month: u32,
    pub adjust_policy: AdjustPolicy,
    pub rate_or_notes: Option<String>,
}

/// Binding as submitted inside a company create/update body.
///
/// Entries carrying an `id` update that binding; entries without one are
/// upserted on (company, obligation type).
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CompanyObligationInput {
    pub id: Option<i64>,
    pub obligation_type_id: i64,
    pub due_day_of_month: u32,
    #[serde(default)]
    pub adjust_policy: AdjustPolicy,
    pub rate_or_notes: Option<String>,
}

/// Computed due dates of one binding for a year of competences
#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VencimentosResponse {
    pub binding_id: i64,
    pub ano: i32,
    pub vencimentos: Vec<Vencimento>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Vencimento {
    /// Competence month (1-12)
    pub mes: u32,
    pub ano: i32,
    /// ISO date, `YYYY-MM-DD`
    pub due_date: String,
}

/// Whether a binding's obligation was fulfilled for a competence period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub id: i64,
    pub binding_id: i64,
    pub month: u32,
    #[serde(rename = "ano")]
    pub year: i32,
    pub delivered: bool,
    pub delivered_at: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RecordDeliveryRequest {
    pub binding_id: i64,
    pub month: u32,
    #[serde(rename = "ano")]
    pub year: i32,
    pub delivered: bool,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveriesResponse {
    pub deliveries: Vec<DeliveryRecord>,
}

/// One row of the cross-obligation rollup
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedObligation {
    pub obligation_type_id: i64,
    pub obligation_name: String,
    pub kind: ObligationKind,
    pub total_companies: i64,
    pub total_delivered: i64,
    pub total_pending: i64,
    pub percentage: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationResponse {
    pub mes: u32,
    pub ano: i32,
    pub obligations: Vec<ConsolidatedObligation>,
}

/// Delivery state of one company for a given obligation and period
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ObligationCompanyStatus {
    pub binding_id: i64,
    pub company_id: i64,
    pub razao_social: String,
    pub cnpj: String,
    pub due_date: String,
    pub delivered: bool,
    pub delivered_at: Option<i64>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ObligationStatusResponse {
    pub obligation: ObligationType,
    pub mes: u32,
    pub ano: i32,
    pub total_companies: i64,
    pub total_delivered: i64,
    pub percentage: i64,
    pub companies: Vec<ObligationCompanyStatus>,
}

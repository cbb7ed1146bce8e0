use serde::{Deserialize, Serialize};

pub mod analysis;
pub mod annotation;
pub mod company;
pub mod expense;
pub mod obligation;
pub mod preferences;
pub mod settings;
pub mod status;

pub use analysis::{
    CreateAnalysisRequest, NcmAnalysisRequest, NcmAnalysisResponse, NcmStatus, NcmSuggestion,
    TaxAnalysesResponse, TaxAnalysis,
};
pub use annotation::{
    Annotation, AnnotationsResponse, Attachment, AttachmentsResponse, CreateAnnotationRequest,
    CreateAttachmentRequest, ReconciliationIssue, ReconciliationIssuesResponse, RemovalReport,
};
pub use company::{
    CompaniesResponse, Company, CompanyDetail, CreateCompanyRequest, Parcelamento,
    ParcelamentoInput, UpdateCompanyRequest,
};
pub use expense::{
    Expense, ExpenseGroupTotal, ExpenseKind, ExpenseOrigin, ExpenseSummary, ExpensesResponse,
    NewExpense, ProcessMessageRequest,
};
pub use obligation::{
    AdjustPolicy, CompanyObligation, CompanyObligationInput, ConsolidatedObligation,
    ConsolidationResponse, CreateObligationTypeRequest, DeliveriesResponse, DeliveryRecord,
    ObligationCompanyStatus, ObligationKind, ObligationStatusResponse, ObligationType,
    ObligationTypesResponse, RecordDeliveryRequest, Vencimento, VencimentosResponse,
};
pub use preferences::{Theme, UpdatePreferencesRequest, UserPreferences};
pub use settings::{ApiKeyConfig, SettingsResponse, UpdateApiKeysRequest};
pub use status::{
    ChecklistFlag, ChecklistToggle, CreateStatusRequest, StatusChecklist,
    StatusChecklistsResponse, UpdateStatusRequest,
};

/// Error response for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(rename = "missingFields", skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<String>>,
}

/// A stored string did not name any variant of the enum
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

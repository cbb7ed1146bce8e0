use shared_types::*;
use std::fs;
use std::path::Path;
use ts_rs::TS;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate TypeScript definitions for API types
    let mut types = Vec::new();

    // Obligation types
    types.push(clean_type(ObligationKind::export_to_string()?));
    types.push(clean_type(AdjustPolicy::export_to_string()?));
    types.push(clean_type(ObligationType::export_to_string()?));
    types.push(clean_type(CreateObligationTypeRequest::export_to_string()?));
    types.push(clean_type(ObligationTypesResponse::export_to_string()?));
    types.push(clean_type(CompanyObligation::export_to_string()?));
    types.push(clean_type(CompanyObligationInput::export_to_string()?));
    types.push(clean_type(Vencimento::export_to_string()?));
    types.push(clean_type(VencimentosResponse::export_to_string()?));

    // Delivery and consolidation types
    types.push(clean_type(DeliveryRecord::export_to_string()?));
    types.push(clean_type(RecordDeliveryRequest::export_to_string()?));
    types.push(clean_type(DeliveriesResponse::export_to_string()?));
    types.push(clean_type(ConsolidatedObligation::export_to_string()?));
    types.push(clean_type(ConsolidationResponse::export_to_string()?));
    types.push(clean_type(ObligationCompanyStatus::export_to_string()?));
    types.push(clean_type(ObligationStatusResponse::export_to_string()?));

    // Company types
    types.push(clean_type(Company::export_to_string()?));
    types.push(clean_type(CompanyDetail::export_to_string()?));
    types.push(clean_type(Parcelamento::export_to_string()?));
    types.push(clean_type(ParcelamentoInput::export_to_string()?));
    types.push(clean_type(CreateCompanyRequest::export_to_string()?));
    types.push(clean_type(UpdateCompanyRequest::export_to_string()?));
    types.push(clean_type(CompaniesResponse::export_to_string()?));

    // Status checklist types
    types.push(clean_type(StatusChecklist::export_to_string()?));
    types.push(clean_type(ChecklistFlag::export_to_string()?));
    types.push(clean_type(ChecklistToggle::export_to_string()?));
    types.push(clean_type(CreateStatusRequest::export_to_string()?));
    types.push(clean_type(UpdateStatusRequest::export_to_string()?));
    types.push(clean_type(StatusChecklistsResponse::export_to_string()?));

    // Annotation and attachment types
    types.push(clean_type(Annotation::export_to_string()?));
    types.push(clean_type(CreateAnnotationRequest::export_to_string()?));
    types.push(clean_type(AnnotationsResponse::export_to_string()?));
    types.push(clean_type(Attachment::export_to_string()?));
    types.push(clean_type(CreateAttachmentRequest::export_to_string()?));
    types.push(clean_type(AttachmentsResponse::export_to_string()?));
    types.push(clean_type(ReconciliationIssue::export_to_string()?));
    types.push(clean_type(ReconciliationIssuesResponse::export_to_string()?));
    types.push(clean_type(RemovalReport::export_to_string()?));

    // Expense types
    types.push(clean_type(ExpenseKind::export_to_string()?));
    types.push(clean_type(ExpenseOrigin::export_to_string()?));
    types.push(clean_type(Expense::export_to_string()?));
    types.push(clean_type(NewExpense::export_to_string()?));
    types.push(clean_type(ExpensesResponse::export_to_string()?));
    types.push(clean_type(ExpenseGroupTotal::export_to_string()?));
    types.push(clean_type(ExpenseSummary::export_to_string()?));
    types.push(clean_type(ProcessMessageRequest::export_to_string()?));

    // Analysis types
    types.push(clean_type(TaxAnalysis::export_to_string()?));
    types.push(clean_type(CreateAnalysisRequest::export_to_string()?));
    types.push(clean_type(TaxAnalysesResponse::export_to_string()?));
    types.push(clean_type(NcmAnalysisRequest::export_to_string()?));
    types.push(clean_type(NcmStatus::export_to_string()?));
    types.push(clean_type(NcmSuggestion::export_to_string()?));
    types.push(clean_type(NcmAnalysisResponse::export_to_string()?));

    // Preferences and settings types
    types.push(clean_type(Theme::export_to_string()?));
    types.push(clean_type(UserPreferences::export_to_string()?));
    types.push(clean_type(UpdatePreferencesRequest::export_to_string()?));
    types.push(clean_type(ApiKeyConfig::export_to_string()?));
    types.push(clean_type(SettingsResponse::export_to_string()?));
    types.push(clean_type(UpdateApiKeysRequest::export_to_string()?));

    let output_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "../web/src/api-types".to_string());
    let output_dir = Path::new(&output_dir);
    fs::create_dir_all(output_dir)?;

    let output_path = output_dir.join("types.ts");
    let output = types.join("\n\n");

    fs::write(&output_path, output)?;
    println!("Generated TypeScript types in {}", output_path.display());

    Ok(())
}

fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    // Keep imports only when the definition references other exported types
    let lines: Vec<&str> = type_def.lines().collect();
    let has_import = lines
        .iter()
        .any(|line| line.trim().starts_with("import type"));

    let filtered: Vec<&str> = lines
        .iter()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.starts_with("import type") {
                return has_import;
            }
            // Filter out the generated comment line
            !trimmed.starts_with("// This file was generated")
                && !trimmed.starts_with("/* This file was generated")
        })
        .cloned()
        .collect();

    let result = filtered.join("\n").trim().to_string();
    if result.is_empty() {
        result
    } else {
        format!("{}\n", result)
    }
}

use actix_web::{get, web, HttpResponse, Responder};
use std::sync::Arc;

use crate::database::Database;
use crate::handlers;

#[get("/health")]
async fn health(db: web::Data<Arc<Database>>) -> impl Responder {
    match db.async_connection.lock().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "status": "unhealthy",
                "database": "disconnected"
            }))
        }
    }
}

/// Every endpoint of the server. Handlers expect these in app data:
/// `Arc<Database>`, `Arc<dyn FileStore>`, `Arc<AgentServices>`,
/// `Arc<dyn PreferencesStore>`, `Arc<NcmCatalog>` and `SettingsAppState`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .route("/api/settings", web::get().to(handlers::settings::get_settings))
        .route("/api/settings/api-keys", web::post().to(handlers::settings::update_api_keys))
        .route("/api/companies", web::get().to(handlers::companies::list_companies))
        .route("/api/companies", web::post().to(handlers::companies::create_company))
        .route("/api/companies/{id}", web::get().to(handlers::companies::get_company))
        .route("/api/companies/{id}", web::put().to(handlers::companies::update_company))
        .route("/api/companies/{id}", web::delete().to(handlers::companies::delete_company))
        .route("/api/companies/{id}/analyses", web::get().to(handlers::analyses::list_analyses))
        .route("/api/companies/{id}/analyses", web::post().to(handlers::analyses::create_analysis))
        .route("/api/analyses/{id}", web::get().to(handlers::analyses::get_analysis))
        .route("/api/obligations", web::get().to(handlers::obligations::list_obligations))
        .route("/api/obligations", web::post().to(handlers::obligations::create_obligation))
        .route("/api/obligations/consolidated", web::get().to(handlers::obligations::consolidated))
        .route("/api/obligations/{id}", web::delete().to(handlers::obligations::delete_obligation))
        .route("/api/obligations/{id}/status", web::get().to(handlers::obligations::obligation_status))
        .route("/api/bindings/{id}", web::get().to(handlers::bindings::get_binding))
        .route("/api/bindings/{id}", web::delete().to(handlers::bindings::delete_binding))
        .route("/api/bindings/{id}/vencimentos", web::get().to(handlers::bindings::vencimentos))
        .route("/api/bindings/{id}/annotations", web::get().to(handlers::bindings::list_annotations))
        .route("/api/bindings/{id}/annotations", web::post().to(handlers::bindings::create_annotation))
        .route("/api/annotations/{id}", web::delete().to(handlers::bindings::delete_annotation))
        .route("/api/bindings/{id}/attachments", web::get().to(handlers::bindings::list_attachments))
        .route("/api/bindings/{id}/attachments", web::post().to(handlers::bindings::create_attachment))
        .route("/api/attachments/{id}", web::delete().to(handlers::bindings::delete_attachment))
        .route("/api/reconciliation-issues", web::get().to(handlers::bindings::list_reconciliation_issues))
        .route("/api/deliveries", web::get().to(handlers::deliveries::list_deliveries))
        .route("/api/deliveries", web::post().to(handlers::deliveries::record_delivery))
        .route("/api/status-empresas", web::get().to(handlers::status::list_statuses))
        .route("/api/status-empresas", web::post().to(handlers::status::create_status))
        .route("/api/status-empresas/empresa/{company_id}", web::get().to(handlers::status::get_status_by_company))
        .route("/api/status-empresas/{id}", web::put().to(handlers::status::update_status))
        .route("/api/expenses", web::get().to(handlers::expenses::list_expenses))
        .route("/api/expenses", web::post().to(handlers::expenses::create_expense))
        .route("/api/expenses/summary", web::get().to(handlers::expenses::expense_summary))
        .route("/api/expenses/{id}", web::delete().to(handlers::expenses::delete_expense))
        .route("/api/processar-mensagem", web::post().to(handlers::messages::processar_mensagem))
        .route("/api/whatsapp/twilio", web::post().to(handlers::messages::twilio_webhook))
        .route("/api/analise-ncm", web::post().to(handlers::ncm::analise_ncm))
        .route("/api/users/{usuario_id}/preferences", web::get().to(handlers::preferences::get_preferences))
        .route("/api/users/{usuario_id}/preferences", web::put().to(handlers::preferences::update_preferences));
}

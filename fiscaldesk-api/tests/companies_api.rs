mod common;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use serde_json::{json, Value};

use common::TestContext;

macro_rules! call_json {
    ($app:expr, $req:expr) => {
        test::call_and_read_body_json::<_, _, Value>(&$app, $req.to_request()).await
    };
}

fn obligation_id(obligations: &Value, name: &str) -> i64 {
    obligations["obligations"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["name"] == name)
        .and_then(|o| o["id"].as_i64())
        .unwrap()
}

fn company_body(cnpj: &str, obrigacoes: Value) -> Value {
    json!({
        "razaoSocial": "Padaria Central Ltda",
        "cnpj": cnpj,
        "regimeTributacao": "Simples Nacional",
        "usuarioId": 7,
        "uf": "mg",
        "obrigacoes": obrigacoes,
        "parcelamentos": [
            { "descricao": "Parcelamento Simples", "totalParcelas": 60, "parcelaAtual": 12 }
        ]
    })
}

#[actix_web::test]
async fn test_create_company_reports_every_missing_field() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let req = test::TestRequest::post()
        .uri("/api/companies")
        .set_json(json!({ "razaoSocial": "  ", "cnpj": "11222333000181" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["missingFields"],
        json!(["razaoSocial", "regimeTributacao", "usuarioId", "uf"])
    );
    assert!(body["error"].as_str().unwrap().contains("razaoSocial"));
}

#[actix_web::test]
async fn test_company_lifecycle() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let catalog = call_json!(app, test::TestRequest::get().uri("/api/obligations"));
    let das = obligation_id(&catalog, "DAS");
    let pgdas = obligation_id(&catalog, "PGDAS-D");

    let created = call_json!(
        app,
        test::TestRequest::post().uri("/api/companies").set_json(company_body(
            "11222333000181",
            json!([
                { "obligationTypeId": das, "dueDayOfMonth": 20, "adjustPolicy": "postpone", "rateOrNotes": "6%" },
                { "obligationTypeId": pgdas, "dueDayOfMonth": 20 }
            ])
        ))
    );
    let company_id = created["id"].as_i64().unwrap();
    assert_eq!(created["uf"], "MG");
    assert_eq!(created["obrigacoesPrincipais"][0]["rateOrNotes"], "6%");
    assert_eq!(created["obrigacoesAcessorias"][0]["adjustPolicy"], "postpone");
    assert_eq!(created["parcelamentos"].as_array().unwrap().len(), 1);

    // CNPJ is unique
    let req = test::TestRequest::post()
        .uri("/api/companies")
        .set_json(company_body("11222333000181", json!([])))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    // Dropping PGDAS-D from the list removes that binding
    let pgdas_binding = created["obrigacoesAcessorias"][0]["id"].as_i64().unwrap();
    let updated = call_json!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/companies/{}", company_id))
            .set_json(json!({
                "nomeFantasia": "Padaria Central",
                "obrigacoes": [
                    { "obligationTypeId": das, "dueDayOfMonth": 15, "adjustPolicy": "anticipate" }
                ]
            }))
    );
    assert_eq!(updated["nomeFantasia"], "Padaria Central");
    assert_eq!(updated["obrigacoesPrincipais"][0]["dueDayOfMonth"], 15);
    assert!(updated["obrigacoesAcessorias"].as_array().unwrap().is_empty());
    assert_eq!(updated["parcelamentos"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri(&format!("/api/bindings/{}", pgdas_binding))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let listed = call_json!(app, test::TestRequest::get().uri("/api/companies"));
    assert_eq!(listed["companies"].as_array().unwrap().len(), 1);

    let report = call_json!(
        app,
        test::TestRequest::delete().uri(&format!("/api/companies/{}", company_id))
    );
    assert_eq!(report["bindings"], 1);
    assert!(report["issues"].as_array().unwrap().is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/api/companies/{}", company_id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_rate_notes_rejected_on_accessory_binding() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let catalog = call_json!(app, test::TestRequest::get().uri("/api/obligations"));
    let pgdas = obligation_id(&catalog, "PGDAS-D");

    let req = test::TestRequest::post()
        .uri("/api/companies")
        .set_json(company_body(
            "11222333000181",
            json!([{ "obligationTypeId": pgdas, "dueDayOfMonth": 20, "rateOrNotes": "3%" }]),
        ))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    // The whole create rolled back
    let listed = call_json!(app, test::TestRequest::get().uri("/api/companies"));
    assert!(listed["companies"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_status_checklist_endpoints() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let created = call_json!(
        app,
        test::TestRequest::post()
            .uri("/api/companies")
            .set_json(company_body("11222333000181", json!([])))
    );
    let company_id = created["id"].as_i64().unwrap();

    // Company creation already made the checklist
    let req = test::TestRequest::post()
        .uri("/api/status-empresas")
        .set_json(json!({ "companyId": company_id }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/status-empresas")
        .set_json(json!({ "companyId": 9999 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/status-empresas")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["missingFields"], json!(["companyId"]));

    let status = call_json!(
        app,
        test::TestRequest::get().uri(&format!("/api/status-empresas/empresa/{}", company_id))
    );
    let status_id = status["id"].as_i64().unwrap();

    call_json!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/status-empresas/{}", status_id))
            .set_json(json!({ "analiseNcm": true }))
    );
    let updated = call_json!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/status-empresas/{}", status_id))
            .set_json(json!({ "repasse": true, "competencia": "03/2024" }))
    );
    assert_eq!(updated["analiseNcm"], true);
    assert_eq!(updated["repasse"], true);
    assert_eq!(updated["integracao"], false);
    assert_eq!(updated["competencia"], "03/2024");

    let req = test::TestRequest::put()
        .uri("/api/status-empresas/9999")
        .set_json(json!({ "repasse": true }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_binding_removal_cascades_dependents() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let catalog = call_json!(app, test::TestRequest::get().uri("/api/obligations"));
    let ecf = obligation_id(&catalog, "ECF");
    let created = call_json!(
        app,
        test::TestRequest::post().uri("/api/companies").set_json(company_body(
            "11222333000181",
            json!([{ "obligationTypeId": ecf, "dueDayOfMonth": 31 }])
        ))
    );
    let binding_id = created["obrigacoesAcessorias"][0]["id"].as_i64().unwrap();

    let annotation = call_json!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/bindings/{}/annotations", binding_id))
            .set_json(json!({ "month": 3, "ano": 2024, "text": "Aguardando balancete" }))
    );
    assert_eq!(annotation["ano"], 2024);

    let attachment = call_json!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/bindings/{}/attachments", binding_id))
            .set_json(json!({ "fileName": "recibo ecf.pdf", "contentType": "application/pdf" }))
    );
    let storage_key = attachment["storageKey"].as_str().unwrap();
    assert!(storage_key.starts_with(&format!("bindings/{}/", binding_id)));

    let report = call_json!(
        app,
        test::TestRequest::delete().uri(&format!("/api/bindings/{}", binding_id))
    );
    assert_eq!(report["annotations"], 1);
    assert_eq!(report["attachments"], 1);
    assert_eq!(report["bindings"], 1);
    assert!(report["issues"].as_array().unwrap().is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/api/bindings/{}/annotations", binding_id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let issues = call_json!(app, test::TestRequest::get().uri("/api/reconciliation-issues"));
    assert!(issues["issues"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_preferences_default_then_saved() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let defaults = call_json!(app, test::TestRequest::get().uri("/api/users/4/preferences"));
    assert_eq!(defaults["theme"], "light");
    assert_eq!(defaults["sidebarCollapsed"], false);
    assert!(defaults["updatedAt"].is_null());

    let saved = call_json!(
        app,
        test::TestRequest::put()
            .uri("/api/users/4/preferences")
            .set_json(json!({ "sidebarCollapsed": true }))
    );
    assert_eq!(saved["sidebarCollapsed"], true);
    assert_eq!(saved["theme"], "light");

    let loaded = call_json!(app, test::TestRequest::get().uri("/api/users/4/preferences"));
    assert_eq!(loaded, saved);
}

#[actix_web::test]
async fn test_settings_report_unconfigured_keys() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let settings = call_json!(app, test::TestRequest::get().uri("/api/settings"));
    let keys = settings["api_keys"].as_array().unwrap();
    assert_eq!(keys.len(), 2);
    assert!(keys.iter().all(|k| k["is_configured"] == false));

    let req = test::TestRequest::get().uri("/health").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_update_through_binding_id_keeps_history() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let catalog = call_json!(app, test::TestRequest::get().uri("/api/obligations?kind=accessory"));
    let ecf = obligation_id(&catalog, "ECF");
    let ecd = obligation_id(&catalog, "ECD");

    let created = call_json!(
        app,
        test::TestRequest::post().uri("/api/companies").set_json(company_body(
            "11222333000181",
            json!([{ "obligationTypeId": ecf, "dueDayOfMonth": 20 }])
        ))
    );
    let company_id = created["id"].as_i64().unwrap();
    let binding_id = created["obrigacoesAcessorias"][0]["id"].as_i64().unwrap();

    call_json!(
        app,
        test::TestRequest::post().uri("/api/deliveries").set_json(json!({
            "bindingId": binding_id, "month": 3, "ano": 2024, "delivered": true
        }))
    );

    let updated = call_json!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/companies/{}", company_id))
            .set_json(json!({
                "obrigacoes": [{ "id": binding_id, "obligationTypeId": ecd, "dueDayOfMonth": 25 }]
            }))
    );
    assert_eq!(updated["obrigacoesAcessorias"][0]["id"], binding_id);
    assert_eq!(updated["obrigacoesAcessorias"][0]["obligationName"], "ECD");

    let deliveries = call_json!(
        app,
        test::TestRequest::get().uri(&format!("/api/deliveries?bindingId={}", binding_id))
    );
    assert_eq!(deliveries["deliveries"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::put()
        .uri(&format!("/api/companies/{}", company_id))
        .set_json(json!({
            "obrigacoes": [{ "id": 9999, "obligationTypeId": ecd, "dueDayOfMonth": 25 }]
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

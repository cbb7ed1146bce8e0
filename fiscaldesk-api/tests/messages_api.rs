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

const LUNCH_REPLY: &str = r#"Aqui está:
```json
{"descricao": "Almoço", "valor": "45,90", "categoria": "Alimentação", "tipo": "variavel", "responsavel": "Ana", "data": "2024-02-14"}
```"#;

fn message(text: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/processar-mensagem")
        .set_json(json!({ "mensagem": text }))
}

fn twilio(body: &str, from: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/whatsapp/twilio")
        .set_form([("Body", body), ("From", from)])
}

fn expense(descricao: &str, valor: f64, categoria: &str, tipo: &str, data: &str) -> test::TestRequest {
    test::TestRequest::post().uri("/api/expenses").set_json(json!({
        "descricao": descricao,
        "valor": valor,
        "categoria": categoria,
        "tipo": tipo,
        "responsavel": "Ana",
        "data": data
    }))
}

#[actix_web::test]
async fn test_processar_mensagem_records_whatsapp_expense() {
    let ctx = TestContext::with_llm_reply(LUNCH_REPLY);
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let resp = test::call_service(&app, message("gastei 45,90 no almoço").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["descricao"], "Almoço");
    assert_eq!(created["valor"], 45.9);
    assert_eq!(created["origem"], "whatsapp");
    assert_eq!(created["data"], "2024-02-14");

    let listed = call_json!(app, test::TestRequest::get().uri("/api/expenses?mes=2&ano=2024"));
    assert_eq!(listed["expenses"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_processar_mensagem_unparseable_reply() {
    let ctx = TestContext::with_llm_reply("Desculpe, não entendi.");
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let resp = test::call_service(&app, message("oi tudo bem?").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "could not understand message");

    let listed = call_json!(app, test::TestRequest::get().uri("/api/expenses"));
    assert!(listed["expenses"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_processar_mensagem_without_llm_is_server_error() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let resp = test::call_service(&app, message("gastei 10 reais").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_twilio_webhook_confirms_on_whatsapp() {
    let ctx = TestContext::with_llm_reply(LUNCH_REPLY);
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let resp = test::call_service(
        &app,
        twilio("gastei 45,90 no almoço", "whatsapp:+5531999990000").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/xml"));
    let body = test::read_body(resp).await;
    assert!(std::str::from_utf8(&body).unwrap().contains("<Response/>"));

    let sent = ctx.messenger.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "whatsapp:+5531999990000");
    assert_eq!(
        sent[0].1,
        "Despesa registrada: Almoço - R$ 45.90 (Alimentação, variavel) em 2024-02-14"
    );
}

#[actix_web::test]
async fn test_twilio_webhook_replies_not_understood() {
    let ctx = TestContext::with_llm_reply("sem json por aqui");
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let resp = test::call_service(&app, twilio("???", "whatsapp:+5511988887777").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let sent = ctx.messenger.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.starts_with("Não consegui entender"));

    let listed = call_json!(app, test::TestRequest::get().uri("/api/expenses"));
    assert!(listed["expenses"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_expense_summary_by_period() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    call_json!(app, expense("Aluguel", 1500.0, "Moradia", "fixa", "2024-03-05"));
    call_json!(app, expense("Mercado", 300.0, "Alimentação", "variavel", "2024-03-10"));
    call_json!(app, expense("Padaria", 50.0, "Alimentação", "variavel", "2024-03-11"));
    let other = call_json!(app, expense("Cinema", 80.0, "Lazer", "variavel", "2024-04-02"));

    let summary = call_json!(app, test::TestRequest::get().uri("/api/expenses/summary?mes=3&ano=2024"));
    assert_eq!(summary["total"], 1850.0);
    assert_eq!(summary["fixas"], 1500.0);
    assert_eq!(summary["variaveis"], 350.0);
    assert_eq!(summary["porCategoria"][0]["chave"], "Moradia");
    assert_eq!(summary["porCategoria"][1]["chave"], "Alimentação");
    assert_eq!(summary["porCategoria"][1]["quantidade"], 2);

    let filtered = call_json!(
        app,
        test::TestRequest::get().uri("/api/expenses?mes=3&ano=2024&categoria=Alimenta%C3%A7%C3%A3o")
    );
    assert_eq!(filtered["expenses"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/expenses/{}", other["id"]))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri("/api/expenses?mes=13").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_analise_ncm() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let correct = call_json!(
        app,
        test::TestRequest::post()
            .uri("/api/analise-ncm")
            .set_json(json!({ "ncm": "0401.20.10", "descricao": "Leite UHT integral" }))
    );
    assert_eq!(correct["status"], "correct");
    assert_eq!(correct["confianca"], 1.0);
    assert_eq!(correct["ncm"], "04012010");

    let incorrect = call_json!(
        app,
        test::TestRequest::post()
            .uri("/api/analise-ncm")
            .set_json(json!({ "ncm": "04012010", "descricao": "Cerveja de malte" }))
    );
    assert_eq!(incorrect["status"], "incorrect");
    assert_eq!(incorrect["sugestoes"][0]["ncm"], "22030000");

    let unknown = call_json!(
        app,
        test::TestRequest::post()
            .uri("/api/analise-ncm")
            .set_json(json!({ "ncm": "99999999", "descricao": "Produto qualquer" }))
    );
    assert_eq!(unknown["status"], "not_found");

    let req = test::TestRequest::post()
        .uri("/api/analise-ncm")
        .set_json(json!({ "ncm": "04012010" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["missingFields"], json!(["descricao"]));
}

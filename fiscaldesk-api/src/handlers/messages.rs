use actix_web::{web, HttpResponse};
use fiscaldesk_agents::messaging::{confirmation_message, NOT_UNDERSTOOD_REPLY};
use fiscaldesk_agents::AgentError;
use serde::Deserialize;
use shared_types::{ExpenseOrigin, ProcessMessageRequest};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::ApiError;
use crate::database::expenses as db;
use crate::database::Database;
use crate::helpers::agents::AgentServices;

const EMPTY_TWIML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response/>"#;

/// Form fields Twilio posts for an inbound WhatsApp message
#[derive(Debug, Deserialize)]
pub struct TwilioInbound {
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "From", default)]
    pub from: String,
}

pub async fn processar_mensagem(
    database: web::Data<Arc<Database>>,
    agents: web::Data<Arc<AgentServices>>,
    request: web::Json<ProcessMessageRequest>,
) -> Result<HttpResponse, ApiError> {
    let today = chrono::Local::now().date_naive();
    let new_expense = agents.interpreter()?.interpret(&request.mensagem, today).await?;

    let expense =
        db::insert_expense(database.async_connection.clone(), &new_expense, ExpenseOrigin::Whatsapp)
            .await?;

    Ok(HttpResponse::Created().json(expense))
}

/// Twilio webhook: record the expense and answer the sender on WhatsApp
pub async fn twilio_webhook(
    database: web::Data<Arc<Database>>,
    agents: web::Data<Arc<AgentServices>>,
    form: web::Form<TwilioInbound>,
) -> Result<HttpResponse, ApiError> {
    let inbound = form.into_inner();
    info!("Inbound WhatsApp message from {}", inbound.from);

    let today = chrono::Local::now().date_naive();
    let reply = match agents.interpreter()?.interpret(&inbound.body, today).await {
        Ok(new_expense) => {
            let expense = db::insert_expense(
                database.async_connection.clone(),
                &new_expense,
                ExpenseOrigin::Whatsapp,
            )
            .await?;
            confirmation_message(&expense)
        }
        Err(AgentError::Unparseable(reason)) => {
            warn!("Replying not-understood to {}: {}", inbound.from, reason);
            NOT_UNDERSTOOD_REPLY.to_string()
        }
        Err(e) => return Err(e.into()),
    };

    if inbound.from.trim().is_empty() {
        warn!("Inbound message has no sender; reply dropped");
    } else {
        match agents.messaging() {
            Ok(messaging) => {
                if let Err(e) = messaging.send(&inbound.from, &reply).await {
                    warn!("Failed to send WhatsApp reply to {}: {}", inbound.from, e);
                }
            }
            Err(e) => warn!("WhatsApp reply skipped: {}", e),
        }
    }

    Ok(HttpResponse::Ok()
        .content_type("text/xml")
        .body(EMPTY_TWIML))
}

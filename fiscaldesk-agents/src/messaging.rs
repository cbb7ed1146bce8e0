use async_trait::async_trait;
use shared_types::Expense;
use tracing::{info, warn};

use crate::AgentError;

pub const NOT_UNDERSTOOD_REPLY: &str =
    "Não consegui entender sua mensagem. Tente algo como: \"gastei 45,90 no almoço hoje\".";

/// Outbound text messages to chat users
#[async_trait]
pub trait MessagingClient: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<(), AgentError>;
}

pub fn confirmation_message(expense: &Expense) -> String {
    format!(
        "Despesa registrada: {} - R$ {:.2} ({}, {}) em {}",
        expense.descricao,
        expense.valor,
        expense.categoria,
        expense.tipo.as_str(),
        expense.data
    )
}

pub struct TwilioClient {
    client: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioClient {
    pub fn new(
        client: reqwest::Client,
        account_sid: &str,
        auth_token: &str,
        from_number: &str,
    ) -> Self {
        Self {
            client,
            base_url: "https://api.twilio.com/2010-04-01".to_string(),
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            from_number: from_number.to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/Accounts/{}/Messages.json", self.base_url, self.account_sid)
    }
}

/// Twilio expects both ends of a WhatsApp conversation prefixed with `whatsapp:`
fn whatsapp_address(number: &str) -> String {
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{}", number)
    }
}

#[async_trait]
impl MessagingClient for TwilioClient {
    async fn send(&self, to: &str, body: &str) -> Result<(), AgentError> {
        let to = whatsapp_address(to);
        let from = whatsapp_address(&self.from_number);

        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to.as_str()), ("From", from.as_str()), ("Body", body)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Twilio rejected message");
            return Err(AgentError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        info!(to = %to, "Sent WhatsApp message");
        Ok(())
    }
}

use fiscaldesk_agents::{
    AgentError, ChatCompletionsClient, ExpenseInterpreter, LlmClient, MessagingClient, TaxAnalyst,
    TwilioClient,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{ApiConfig, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MAX_TOKENS, DEFAULT_LLM_MODEL};

/// Outbound integrations; each is absent when its config section lacks credentials
pub struct AgentServices {
    interpreter: Option<ExpenseInterpreter>,
    analyst: Option<TaxAnalyst>,
    messaging: Option<Arc<dyn MessagingClient>>,
}

impl AgentServices {
    pub fn new(
        llm: Option<Arc<dyn LlmClient>>,
        max_tokens: u32,
        messaging: Option<Arc<dyn MessagingClient>>,
    ) -> Self {
        Self {
            interpreter: llm.clone().map(ExpenseInterpreter::new),
            analyst: llm.map(|client| TaxAnalyst::new(client, max_tokens)),
            messaging,
        }
    }

    pub fn from_config(config: &ApiConfig, http: reqwest::Client) -> Self {
        let llm_config = config.llm.clone().unwrap_or_default();
        let llm: Option<Arc<dyn LlmClient>> = match llm_config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {
                let model = llm_config.model.as_deref().unwrap_or(DEFAULT_LLM_MODEL);
                info!("LLM client configured with model {}", model);
                Some(Arc::new(ChatCompletionsClient::new(
                    http.clone(),
                    llm_config.base_url.as_deref().unwrap_or(DEFAULT_LLM_BASE_URL),
                    key,
                    model,
                )))
            }
            _ => {
                warn!("llm.api_key is not set; message ingestion and analyses are disabled");
                None
            }
        };

        let twilio = config.twilio.clone().unwrap_or_default();
        let messaging: Option<Arc<dyn MessagingClient>> =
            match (twilio.account_sid, twilio.auth_token, twilio.from_number) {
                (Some(sid), Some(token), Some(from)) => {
                    Some(Arc::new(TwilioClient::new(http, &sid, &token, &from)))
                }
                _ => {
                    warn!("twilio section incomplete; WhatsApp replies are disabled");
                    None
                }
            };

        Self::new(
            llm,
            llm_config.max_tokens.unwrap_or(DEFAULT_LLM_MAX_TOKENS),
            messaging,
        )
    }

    pub fn interpreter(&self) -> Result<&ExpenseInterpreter, AgentError> {
        self.interpreter.as_ref().ok_or(AgentError::NotConfigured("llm"))
    }

    pub fn analyst(&self) -> Result<&TaxAnalyst, AgentError> {
        self.analyst.as_ref().ok_or(AgentError::NotConfigured("llm"))
    }

    pub fn messaging(&self) -> Result<&dyn MessagingClient, AgentError> {
        self.messaging
            .as_deref()
            .ok_or(AgentError::NotConfigured("twilio"))
    }
}

use chrono::NaiveDate;
use fiscal_rules::InterpretedExpense;
use shared_types::NewExpense;
use std::sync::Arc;
use tracing::{info, warn};

use crate::llm::{CompletionRequest, LlmClient};
use crate::system_prompt::build_expense_prompt;
use crate::AgentError;

/// Turns a free-text chat message into expense fields through the LLM
pub struct ExpenseInterpreter {
    llm_client: Arc<dyn LlmClient>,
}

impl ExpenseInterpreter {
    pub fn new(llm_client: Arc<dyn LlmClient>) -> Self {
        Self { llm_client }
    }

    pub async fn interpret(&self, message: &str, today: NaiveDate) -> Result<NewExpense, AgentError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AgentError::Unparseable("empty message".to_string()));
        }

        let completion = self
            .llm_client
            .complete(CompletionRequest {
                system: Some(build_expense_prompt(today)),
                prompt: message.to_string(),
                max_tokens: 300,
                temperature: Some(0.0),
            })
            .await?;

        let interpreted = InterpretedExpense::from_reply(&completion.text).map_err(|e| {
            warn!("LLM reply could not be interpreted: {}", e);
            AgentError::Unparseable(e.to_string())
        })?;

        let expense = interpreted.into_new_expense(message, today);
        info!(
            "Interpreted message as expense: categoria={}, valor={}",
            expense.categoria, expense.valor
        );

        Ok(expense)
    }
}

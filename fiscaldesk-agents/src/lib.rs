pub mod expense_interpreter;
pub mod llm;
pub mod messaging;
pub mod system_prompt;
pub mod tax_analyst;

pub use expense_interpreter::ExpenseInterpreter;
pub use llm::{ChatCompletionsClient, Completion, CompletionRequest, LlmClient};
pub use messaging::{MessagingClient, TwilioClient};
pub use tax_analyst::{AnalysisContext, TaxAnalyst};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("could not understand message: {0}")]
    Unparseable(String),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

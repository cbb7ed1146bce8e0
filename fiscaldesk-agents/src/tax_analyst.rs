use std::sync::Arc;
use tracing::info;

use crate::llm::{Completion, CompletionRequest, LlmClient};
use crate::system_prompt::build_analysis_system_prompt;
use crate::AgentError;

/// Company facts the analysis is grounded on
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub razao_social: String,
    pub cnpj: String,
    pub regime_tributacao: String,
    pub uf: String,
    pub obrigacoes: Vec<String>,
    pub parcelamentos: Vec<String>,
    pub pergunta: Option<String>,
}

impl AnalysisContext {
    pub fn to_prompt(&self) -> String {
        let list = |items: &[String]| {
            if items.is_empty() {
                "- nenhuma".to_string()
            } else {
                items
                    .iter()
                    .map(|i| format!("- {}", i))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        };

        let mut prompt = format!(
            "Empresa: {}\nCNPJ: {}\nRegime de tributação: {}\nUF: {}\n\nObrigações:\n{}\n\nParcelamentos:\n{}\n",
            self.razao_social,
            self.cnpj,
            self.regime_tributacao,
            self.uf,
            list(&self.obrigacoes),
            list(&self.parcelamentos),
        );

        match &self.pergunta {
            Some(question) if !question.trim().is_empty() => {
                prompt.push_str(&format!("\nPergunta: {}\n", question.trim()));
            }
            _ => prompt.push_str("\nFaça uma análise tributária geral da empresa.\n"),
        }

        prompt
    }
}

pub struct TaxAnalyst {
    llm_client: Arc<dyn LlmClient>,
    max_tokens: u32,
}

impl TaxAnalyst {
    pub fn new(llm_client: Arc<dyn LlmClient>, max_tokens: u32) -> Self {
        Self {
            llm_client,
            max_tokens,
        }
    }

    pub async fn analyze(&self, context: &AnalysisContext) -> Result<Completion, AgentError> {
        info!("Requesting tax analysis for {}", context.cnpj);

        self.llm_client
            .complete(CompletionRequest {
                system: Some(build_analysis_system_prompt()),
                prompt: context.to_prompt(),
                max_tokens: self.max_tokens,
                temperature: Some(0.3),
            })
            .await
    }
}

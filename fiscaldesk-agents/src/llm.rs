//! Client for OpenAI-compatible `/chat/completions` endpoints.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::AgentError;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub model: String,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    fn model(&self) -> &str;
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, AgentError>;
}

pub struct ChatCompletionsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    model: Option<String>,
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionsClient {
    /// `client` carries the request timeout; `base_url` has no trailing slash,
    /// e.g. `https://api.openai.com/v1`.
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    fn build_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": request.prompt }));

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": request.max_tokens,
        });
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }

    fn into_completion(&self, response: ChatResponse) -> Result<Completion, AgentError> {
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AgentError::Provider {
                status: 200,
                body: "completion had no content".to_string(),
            })?;

        Ok(Completion {
            text,
            model: response.model.unwrap_or_else(|| self.model.clone()),
        })
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, AgentError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, model = %self.model, "requesting completion");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_body(&request))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "LLM provider rejected request");
            return Err(AgentError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let response: ChatResponse = resp.json().await?;
        self.into_completion(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ChatCompletionsClient {
        ChatCompletionsClient::new(reqwest::Client::new(), "https://llm.example/v1/", "k", "gpt-4o-mini")
    }

    #[test]
    fn test_body_includes_system_message_first() {
        let body = client().build_body(&CompletionRequest {
            system: Some("be brief".to_string()),
            prompt: "hello".to_string(),
            max_tokens: 100,
            temperature: Some(0.0),
        });

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert_eq!(body["max_tokens"], 100);
        assert_eq!(body["temperature"], 0.0);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        assert_eq!(client().base_url, "https://llm.example/v1");
    }

    #[test]
    fn test_first_choice_becomes_completion() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"model": "gpt-4o-mini-2024", "choices": [{"message": {"content": "{}"}}]}"#,
        )
        .unwrap();

        let completion = client().into_completion(response).unwrap();
        assert_eq!(completion.text, "{}");
        assert_eq!(completion.model, "gpt-4o-mini-2024");
    }

    #[test]
    fn test_empty_choices_is_a_provider_error() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            client().into_completion(response),
            Err(AgentError::Provider { .. })
        ));
    }
}

use serde::{Deserialize, Serialize};

use super::ModelGateway;
use crate::core::error::DchatError;
use crate::discussion::Message;
use crate::providers::base_client::BaseApiClient;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatCompletionMessage>,
}

#[derive(Serialize)]
struct ChatCompletionMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

/// OpenAI-style chat-completions gateway. Works against any compatible
/// endpoint via [`OpenAIGateway::with_endpoint`].
pub struct OpenAIGateway {
    client: BaseApiClient,
}

impl OpenAIGateway {
    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT.to_string(), api_key)
    }

    pub fn with_endpoint(endpoint: String, api_key: String) -> Self {
        Self {
            client: BaseApiClient::new(endpoint, api_key),
        }
    }
}

#[async_trait::async_trait]
impl ModelGateway for OpenAIGateway {
    async fn complete(&self, messages: &[Message], model: &str) -> Result<String, DchatError> {
        let req_messages: Vec<ChatCompletionMessage> = messages
            .iter()
            .map(|m| ChatCompletionMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect();

        let payload = ChatCompletionRequest {
            model: model.to_string(),
            messages: req_messages,
        };

        let response = self.client.post("chat/completions", &payload).await?;
        let body = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;

        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| DchatError::Gateway("No choices in API response".to_string()))?;

        if content.is_empty() {
            return Err(DchatError::Gateway("Empty reply from model".to_string()));
        }

        Ok(content)
    }
}

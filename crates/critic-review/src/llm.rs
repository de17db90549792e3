use std::time::Duration;

use async_trait::async_trait;
use critic_core::{CriticError, LlmConfig};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A text-completion backend: one prompt in, one answer out.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Send `prompt` as a single user message and return the text answer.
    async fn complete(&self, prompt: &str) -> Result<String, CriticError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

/// A message in a conversation with the model.
///
/// # Examples
///
/// ```
/// use critic_review::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage::user("Review this code");
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

impl ChatMessage {
    /// A user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Role in the conversation.
///
/// # Examples
///
/// ```
/// use critic_review::llm::Role;
///
/// assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input.
    User,
    /// Assistant response.
    Assistant,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

/// Anthropic Messages API client.
///
/// # Examples
///
/// ```
/// use critic_core::LlmConfig;
/// use critic_review::llm::AnthropicClient;
///
/// let config = LlmConfig {
///     api_key: Some("test-key".into()),
///     ..LlmConfig::default()
/// };
/// let client = AnthropicClient::new(&config).unwrap();
/// ```
pub struct AnthropicClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl AnthropicClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, CriticError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| CriticError::Llm(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn endpoint(&self) -> String {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{base_url}/v1/messages")
    }
}

#[async_trait]
impl CompletionModel for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String, CriticError> {
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![ChatMessage::user(prompt)],
        };

        let mut request = self
            .client
            .post(self.endpoint())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json");
        if let Some(api_key) = &self.config.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| CriticError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(CriticError::Llm(format!(
                "LLM API error {status}: {body_text}"
            )));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CriticError::Llm(format!("failed to parse response: {e}")))?;

        extract_text(response_body)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Pull the first content block's text out of a Messages API response.
fn extract_text(body: serde_json::Value) -> Result<String, CriticError> {
    let parsed: MessagesResponse = serde_json::from_value(body.clone())
        .map_err(|_| CriticError::Llm(format!("unexpected response structure: {body}")))?;
    parsed
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or_else(|| CriticError::Llm(format!("response has no text content: {body}")))
}

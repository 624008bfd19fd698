// Chat-completion backends used for planning and tool selection
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{LlmBackendKind, LlmSettings};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM response contained no message")]
    EmptyResponse,

    #[error("failed to decode LLM response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// A JSON-encoded string for OpenAI-style servers, an object for Ollama.
    #[serde(default)]
    pub arguments: Value,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Non-blank text content, if any.
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: None,
            function: FunctionCall {
                name: name.into(),
                arguments,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn arguments_object(&self) -> Result<Map<String, Value>, String> {
        match &self.function.arguments {
            Value::Null => Ok(Map::new()),
            Value::Object(map) => Ok(map.clone()),
            Value::String(raw) if raw.trim().is_empty() => Ok(Map::new()),
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(other) => Err(format!("tool arguments must be an object, got {}", other)),
                Err(e) => Err(format!("tool arguments are not valid JSON: {}", e)),
            },
            other => Err(format!("tool arguments must be an object, got {}", other)),
        }
    }

    /// Arguments rendered as a compact JSON string for logs.
    pub fn arguments_display(&self) -> String {
        match &self.function.arguments {
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        }
    }
}

/// One chat completion per call; no retries at this layer.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn model(&self) -> &str;

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[Value]>,
    ) -> Result<ChatMessage, LlmError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [Value]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: Option<ChatMessage>,
}

fn http_client(settings: &LlmSettings) -> Result<Client, LlmError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(settings.timeout_seconds))
        .build()?)
}

async fn post_json<T: for<'de> Deserialize<'de>>(
    client: &Client,
    url: &str,
    api_key: Option<&str>,
    body: &ChatRequest<'_>,
) -> Result<T, LlmError> {
    let mut request = client.post(url).json(body);
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(LlmError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    serde_json::from_str(&text).map_err(|e| LlmError::Decode(e.to_string()))
}

/// Any server speaking the OpenAI chat-completions schema.
pub struct OpenAiCompatibleBackend {
    client: Client,
    model: String,
    base_url: String,
    api_key: String,
}

impl OpenAiCompatibleBackend {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client(settings)?,
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiCompatibleBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[Value]>,
    ) -> Result<ChatMessage, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages,
            tools,
            stream: None,
        };
        let response: OpenAiResponse =
            post_json(&self.client, &url, Some(&self.api_key), &body).await?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Ollama's native chat endpoint.
pub struct OllamaBackend {
    client: Client,
    model: String,
    endpoint: String,
}

impl OllamaBackend {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        let base = settings.base_url.trim_end_matches('/');
        let base = base.strip_suffix("/v1").unwrap_or(base);
        Ok(Self {
            client: http_client(settings)?,
            model: settings.model.clone(),
            endpoint: format!("{}/api/chat", base),
        })
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[Value]>,
    ) -> Result<ChatMessage, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            tools,
            stream: Some(false),
        };
        let response: OllamaResponse = post_json(&self.client, &self.endpoint, None, &body).await?;
        response.message.ok_or(LlmError::EmptyResponse)
    }
}

/// `None` when the LLM is switched off in configuration.
pub fn build_backend(settings: &LlmSettings) -> Result<Option<Arc<dyn ChatBackend>>, LlmError> {
    if !settings.enabled {
        return Ok(None);
    }
    let backend: Arc<dyn ChatBackend> = match settings.backend {
        LlmBackendKind::OpenaiCompatible => Arc::new(OpenAiCompatibleBackend::new(settings)?),
        LlmBackendKind::Ollama => Arc::new(OllamaBackend::new(settings)?),
    };
    tracing::info!("🧠 LLM backend ready (model={}, {:?})", backend.model(), settings.backend);
    Ok(Some(backend))
}

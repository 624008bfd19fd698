// Shared fakes for the LLM backend and the tool invoker
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use spacetraders_intent_agent::client::{
    ChatBackend, ChatMessage, LlmError, ToolCall, ToolError, ToolInvoker, ToolResponse,
};

/// Replies from a script, one per call; an exhausted script is an error.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<ChatMessage, LlmError>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<ChatMessage, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, messages: &[ChatMessage], _tools: Option<&[Value]>) -> Result<ChatMessage, LlmError> {
        if let Some(last) = messages.last().and_then(|m| m.content.clone()) {
            self.prompts.lock().unwrap().push(last);
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyResponse))
    }
}

pub fn text_reply(text: &str) -> Result<ChatMessage, LlmError> {
    Ok(ChatMessage::assistant(text))
}

pub fn tool_reply(name: &str, arguments: Value) -> Result<ChatMessage, LlmError> {
    Ok(ChatMessage {
        role: "assistant".to_string(),
        content: None,
        tool_calls: vec![ToolCall::new(name, arguments)],
    })
}

/// Answers every call with the same result and records the calls made.
pub struct FixedInvoker {
    result: Result<ToolResponse, String>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl FixedInvoker {
    pub fn ok(body: Value) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: i32, body: Value) -> Self {
        Self {
            result: Ok(ToolResponse::new(status, body)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ToolInvoker for FixedInvoker {
    fn definitions(&self) -> Vec<Value> {
        vec![json!({ "type": "function", "function": { "name": "get-my-agent" } })]
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolResponse, ToolError> {
        self.calls.lock().unwrap().push(call.name().to_string());
        self.result.clone().map_err(|reason| ToolError::Transport {
            tool: call.name().to_string(),
            reason,
        })
    }
}

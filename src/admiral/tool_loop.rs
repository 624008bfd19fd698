// Tool-calling loop - the LLM keeps notes and picks one API operation per tick
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use super::{extract_wait_duration, read_advisory, seconds};
use crate::client::api::pretty;
use crate::client::tools::load_openapi_spec;
use crate::client::{
    build_backend, build_client, ApiToolInvoker, ChatBackend, ChatMessage, ToolCall, ToolCatalog,
    ToolInvoker,
};
use crate::config::{AgentConfig, ENV_API_KEY};
use crate::error::AgentError;
use crate::reasoning::prompts::{
    advisory_merge_prompt, result_fold_prompt, tool_selection_prompt, INITIAL_NOTES,
    TOOL_SYSTEM_PROMPT,
};
use crate::storage::{now_ts, AgentStore};

#[derive(Debug, Clone, PartialEq)]
pub enum ToolTickOutcome {
    /// A wait deadline is still pending; nothing else ran.
    Waiting { remaining: Duration },
    /// The model answered without selecting a tool.
    NoToolCall,
    ToolSucceeded { tool: String, wait: Option<Duration> },
    /// Transport failure, non-2xx response or a failed selection. A 429 still
    /// carries its wait.
    ToolFailed {
        tool: String,
        error: String,
        wait: Option<Duration>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolTick {
    pub outcome: ToolTickOutcome,
    pub next_sleep: Duration,
}

pub struct ToolLoop<I: ToolInvoker> {
    config: AgentConfig,
    store: AgentStore,
    backend: Arc<dyn ChatBackend>,
    invoker: I,
    tools: Vec<Value>,
    last_advisory: Option<String>,
    wait_until: Option<DateTime<Utc>>,
}

/// Entry point for tool mode: needs a credential, an LLM backend and the
/// OpenAPI document. Any of those missing stops the agent.
pub async fn run_tool_mode(config: AgentConfig, store: AgentStore, once: bool) -> Result<(), AgentError> {
    let client = build_client(None, &config.api).ok_or(AgentError::MissingCredential(ENV_API_KEY))?;
    let backend = build_backend(&config.llm)?
        .ok_or_else(|| AgentError::Config("tool mode needs the LLM enabled".to_string()))?;

    let spec = load_openapi_spec(
        &config.tools.spec_source,
        Duration::from_secs(config.api.timeout_seconds),
    )
    .await?;
    let catalog = ToolCatalog::from_openapi(&spec, &config.tools.excluded)?;
    tracing::info!("🔧 Generated {} tools from OpenAPI spec", catalog.len());
    catalog.log_catalog();

    let invoker = ApiToolInvoker::new(catalog, client);
    let mut tool_loop = ToolLoop::new(config, store, backend, invoker);
    tool_loop.run(once).await
}

impl<I: ToolInvoker> ToolLoop<I> {
    /// `store` must already be connected.
    pub fn new(config: AgentConfig, store: AgentStore, backend: Arc<dyn ChatBackend>, invoker: I) -> Self {
        let tools = invoker.definitions();
        Self {
            config,
            store,
            backend,
            invoker,
            tools,
            last_advisory: None,
            wait_until: None,
        }
    }

    pub fn store(&self) -> &AgentStore {
        &self.store
    }

    pub fn wait_until(&self) -> Option<DateTime<Utc>> {
        self.wait_until
    }

    fn poll_interval(&self) -> Duration {
        seconds(self.config.timing.poll_interval_seconds)
    }

    async fn ask(&self, prompt: String, tools: Option<&[Value]>) -> Result<ChatMessage, crate::client::LlmError> {
        if self.config.llm.prompt_debug {
            tracing::info!("📝 Prompt:\n{}", prompt);
        }
        let messages = [ChatMessage::system(TOOL_SYSTEM_PROMPT), ChatMessage::user(prompt)];
        self.backend.complete(&messages, tools).await
    }

    fn current_notes(&self) -> Result<String, AgentError> {
        match self.store.fetch_strategy_notes()? {
            Some(notes) => Ok(notes.content),
            None => {
                self.store.save_strategy_notes(&now_ts(), INITIAL_NOTES)?;
                Ok(INITIAL_NOTES.to_string())
            }
        }
    }

    /// Step 1: fold new human guidance into the notes.
    async fn merge_advisory(&self, notes: String, advisory: &str) -> Result<String, AgentError> {
        tracing::info!("📄 New advisory input; updating notes");
        self.store.append_log(&now_ts(), "advisory", advisory)?;

        match self.ask(advisory_merge_prompt(&notes, advisory), None).await {
            Ok(reply) => match reply.text().map(str::trim).filter(|t| !t.is_empty()) {
                Some(updated) => {
                    self.store.save_strategy_notes(&now_ts(), updated)?;
                    Ok(updated.to_string())
                }
                None => {
                    tracing::warn!("⚠️ Advisory merge returned no notes; keeping previous notes");
                    Ok(notes)
                }
            },
            Err(e) => {
                tracing::warn!("⚠️ Advisory merge failed: {}", e);
                Ok(notes)
            }
        }
    }

    /// Step 3: fold the tool result (or error payload) back into the notes.
    async fn fold_result(&self, notes: &str, tool: &str, result: &Value) -> Result<(), AgentError> {
        match self.ask(result_fold_prompt(notes, tool, &pretty(result)), None).await {
            Ok(reply) => match reply.text().map(str::trim).filter(|t| !t.is_empty()) {
                Some(updated) => {
                    self.store.save_strategy_notes(&now_ts(), updated)?;
                    tracing::debug!("📝 Notes updated after {}", tool);
                }
                None => tracing::warn!("⚠️ Notes update returned nothing; keeping previous notes"),
            },
            Err(e) => tracing::warn!("⚠️ Notes update failed: {}", e),
        }
        Ok(())
    }

    pub async fn tick(&mut self) -> Result<ToolTick, AgentError> {
        let poll = self.poll_interval();

        if let Some(deadline) = self.wait_until {
            let now = Utc::now();
            if now < deadline {
                let remaining = (deadline - now).to_std().unwrap_or_default();
                tracing::debug!("⏳ Waiting {:.1}s more before acting", remaining.as_secs_f64());
                return Ok(ToolTick {
                    outcome: ToolTickOutcome::Waiting { remaining },
                    next_sleep: remaining.min(poll),
                });
            }
            self.wait_until = None;
        }

        let mut notes = self.current_notes()?;

        let advisory = read_advisory(&self.config.paths.input);
        if advisory != self.last_advisory {
            self.last_advisory = advisory.clone();
            if let Some(text) = advisory.as_deref().filter(|t| !t.is_empty()) {
                notes = self.merge_advisory(notes, text).await?;
            }
        }

        let history = self
            .store
            .recent_log_lines(self.config.tools.history_limit)?
            .join("\n");
        let last_error = self.store.fetch_error_context()?.map(|ctx| ctx.error_message);

        let selection = self
            .ask(
                tool_selection_prompt(&notes, &history, last_error.as_deref()),
                Some(self.tools.as_slice()),
            )
            .await;

        let (tool, result, outcome) = match selection {
            Ok(reply) => {
                let Some(call) = reply.tool_calls.first().cloned() else {
                    tracing::warn!("⚠️ Model did not call a tool this tick");
                    return Ok(ToolTick {
                        outcome: ToolTickOutcome::NoToolCall,
                        next_sleep: poll,
                    });
                };
                self.invoke(call).await?
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!("❌ Tool selection failed: {}", message);
                self.store.save_error_context(&now_ts(), None, &message, "tool selection")?;
                let outcome = ToolTickOutcome::ToolFailed {
                    tool: "unknown".to_string(),
                    error: message.clone(),
                    wait: None,
                };
                ("unknown".to_string(), json!({ "error": message }), outcome)
            }
        };

        self.fold_result(&notes, &tool, &result).await?;

        Ok(ToolTick {
            outcome,
            next_sleep: poll,
        })
    }

    /// Step 2b: run the selected operation and record what happened.
    async fn invoke(&mut self, call: ToolCall) -> Result<(String, Value, ToolTickOutcome), AgentError> {
        let name = call.name().to_string();
        let arguments = call.arguments_display();
        tracing::info!("🔧 Calling {} {}", name, arguments);
        self.store
            .append_log(&now_ts(), "tool_call", &format!("{} {}", name, arguments))?;

        let response = match self.invoker.invoke(&call).await {
            Ok(response) => response,
            Err(e) => {
                let message = e.to_string();
                tracing::error!("❌ Tool {} failed: {}", name, message);
                self.store
                    .append_log(&now_ts(), "tool_error", &format!("{}: {}", name, message))?;
                self.store
                    .save_error_context(&now_ts(), Some(&name), &message, &arguments)?;
                let outcome = ToolTickOutcome::ToolFailed {
                    tool: name.clone(),
                    error: message.clone(),
                    wait: None,
                };
                return Ok((name, json!({ "error": message }), outcome));
            }
        };

        let wait = self.schedule_wait(&name, &response.body);

        if response.is_success() {
            self.store
                .append_log(&now_ts(), "tool_result", &format!("{}: success", name))?;
            self.store.clear_error_context()?;
            let outcome = ToolTickOutcome::ToolSucceeded {
                tool: name.clone(),
                wait,
            };
            return Ok((name, response.body, outcome));
        }

        let message = response.failure_message();
        tracing::warn!("⚠️ Tool {} returned {}", name, message);
        self.store
            .append_log(&now_ts(), "tool_error", &format!("{}: {}", name, message))?;
        self.store.save_error_context(
            &now_ts(),
            Some(&name),
            &message,
            &pretty(&response.body),
        )?;
        let outcome = ToolTickOutcome::ToolFailed {
            tool: name.clone(),
            error: message,
            wait,
        };
        Ok((name, response.body, outcome))
    }

    /// Sets `wait_until` from any deadline named in `body`.
    fn schedule_wait(&mut self, name: &str, body: &Value) -> Option<Duration> {
        let now = Utc::now();
        let wait = extract_wait_duration(body, now).map(seconds)?;
        if let Ok(delta) = chrono::Duration::from_std(wait) {
            self.wait_until = Some(now + delta);
        }
        tracing::info!("⏳ {} asks to wait {:.1}s", name, wait.as_secs_f64());
        Some(wait)
    }

    /// Runs until interrupted, or for exactly one tick when `once` is set.
    pub async fn run(&mut self, once: bool) -> Result<(), AgentError> {
        tracing::info!(
            "🚀 Tool loop started with {} tools (model={})",
            self.tools.len(),
            self.backend.model()
        );
        loop {
            let tick = self.tick().await?;
            if once {
                return Ok(());
            }
            tokio::time::sleep(tick.next_sleep).await;
        }
    }
}

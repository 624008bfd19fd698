// Intent planner - one LLM round trip with a deterministic fallback
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::client::llm::{ChatBackend, ChatMessage, LlmError};
use crate::models::{Intent, IntentType, StateSnapshot, ADVISORY_SOURCE};
use crate::reasoning::prompts::{planner_system_prompt, PLANNER_INSTRUCTION};

pub const FALLBACK_GOAL: &str = "Assess market opportunities";
pub const FALLBACK_REASONING: &str =
    "Fallback: reasoning backend unavailable or returned unusable output.";

#[derive(Debug, thiserror::Error)]
enum PlanningError {
    #[error("no reasoning backend configured")]
    NoBackend,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("empty response content")]
    EmptyContent,

    #[error("invalid intent JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidIntentType(String),
}

#[derive(Deserialize)]
struct RawIntent {
    intent_type: String,
    goal: String,
    reasoning: String,
    #[serde(default)]
    details: Option<Map<String, Value>>,
}

pub struct IntentPlanner {
    backend: Option<Arc<dyn ChatBackend>>,
    prompt_debug: bool,
}

impl IntentPlanner {
    pub fn new(backend: Option<Arc<dyn ChatBackend>>, prompt_debug: bool) -> Self {
        Self { backend, prompt_debug }
    }

    /// Never fails: any problem on the LLM path yields the fallback intent.
    pub async fn plan_next_intent(
        &self,
        state_snapshot: Option<&StateSnapshot>,
        strategy_notes: Option<&str>,
        advisory_input: Option<&str>,
    ) -> Intent {
        let advisory_source = advisory_input
            .filter(|text| !text.is_empty())
            .map(|_| ADVISORY_SOURCE.to_string());

        match self.plan_with_backend(state_snapshot, strategy_notes, advisory_input).await {
            Ok(intent) => intent.with_advisory_source(advisory_source),
            Err(e) => {
                match e {
                    PlanningError::NoBackend => tracing::debug!("🧠 {}; using fallback intent", e),
                    _ => tracing::warn!("⚠️ Planning failed ({}); using fallback intent", e),
                }
                fallback_intent(state_snapshot, strategy_notes, advisory_input)
                    .with_advisory_source(advisory_source)
            }
        }
    }

    async fn plan_with_backend(
        &self,
        state_snapshot: Option<&StateSnapshot>,
        strategy_notes: Option<&str>,
        advisory_input: Option<&str>,
    ) -> Result<Intent, PlanningError> {
        let backend = self.backend.as_ref().ok_or(PlanningError::NoBackend)?;

        let system = planner_system_prompt();
        let user = build_user_message(state_snapshot, strategy_notes, advisory_input)?;
        if self.prompt_debug {
            tracing::info!("📝 Planner prompt (system):\n{}", system);
            tracing::info!("📝 Planner prompt (user):\n{}", user);
        }

        let messages = [ChatMessage::system(system), ChatMessage::user(user)];
        let reply = backend.complete(&messages, None).await?;
        let content = reply.text().ok_or(PlanningError::EmptyContent)?;
        if self.prompt_debug {
            tracing::info!("📝 Planner raw reply:\n{}", content);
        }

        parse_intent(content)
    }
}

fn build_user_message(
    state_snapshot: Option<&StateSnapshot>,
    strategy_notes: Option<&str>,
    advisory_input: Option<&str>,
) -> Result<String, serde_json::Error> {
    let payload = json!({
        "state_snapshot": state_snapshot,
        "strategy_notes": strategy_notes,
        "advisory_input": advisory_input,
        "instruction": PLANNER_INSTRUCTION,
    });
    serde_json::to_string_pretty(&payload)
}

/// Removes a surrounding markdown code fence (with or without a language tag).
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

fn parse_intent(content: &str) -> Result<Intent, PlanningError> {
    let raw: RawIntent = serde_json::from_str(strip_code_fences(content))?;
    let intent_type = raw
        .intent_type
        .parse::<IntentType>()
        .map_err(PlanningError::InvalidIntentType)?;

    Ok(Intent::new(intent_type, raw.goal, raw.reasoning).with_details(raw.details.unwrap_or_default()))
}

/// The deterministic intent used whenever the LLM path cannot produce one.
/// Details only record which inputs were present, never their content.
pub fn fallback_intent(
    state_snapshot: Option<&StateSnapshot>,
    strategy_notes: Option<&str>,
    advisory_input: Option<&str>,
) -> Intent {
    let mut details = Map::new();
    details.insert("state_summary".to_string(), Value::Bool(state_snapshot.is_some()));
    details.insert(
        "notes_present".to_string(),
        Value::Bool(strategy_notes.is_some_and(|n| !n.is_empty())),
    );
    details.insert(
        "advisory_present".to_string(),
        Value::Bool(advisory_input.is_some_and(|a| !a.is_empty())),
    );

    Intent::new(IntentType::GatherMarketData, FALLBACK_GOAL, FALLBACK_REASONING).with_details(details)
}

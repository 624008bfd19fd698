// Intents - high-level actions proposed by the planner
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Marker recorded on an intent whose planning was triggered by advisory text.
pub const ADVISORY_SOURCE: &str = "input.md";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentType {
    Explore,
    Trade,
    Reposition,
    GatherMarketData,
}

impl IntentType {
    pub const ALL: [IntentType; 4] = [
        IntentType::Explore,
        IntentType::Trade,
        IntentType::Reposition,
        IntentType::GatherMarketData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentType::Explore => "explore",
            IntentType::Trade => "trade",
            IntentType::Reposition => "reposition",
            IntentType::GatherMarketData => "gather_market_data",
        }
    }
}

impl fmt::Display for IntentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentType {
    type Err = String;

    /// Case-insensitive; anything outside the enumeration is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        IntentType::ALL
            .into_iter()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| format!("unknown intent_type: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intent {
    pub intent_type: IntentType,
    pub goal: String,
    pub reasoning: String,
    pub details: Map<String, Value>,
    pub advisory_source: Option<String>,
}

impl Intent {
    pub fn new(intent_type: IntentType, goal: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            intent_type,
            goal: goal.into(),
            reasoning: reasoning.into(),
            details: Map::new(),
            advisory_source: None,
        }
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = details;
        self
    }

    pub fn with_advisory_source(mut self, source: Option<String>) -> Self {
        self.advisory_source = source;
        self
    }

    /// Compact form used for the audit log.
    pub fn summary(&self) -> String {
        format!("{}: {}", self.intent_type, self.goal)
    }
}

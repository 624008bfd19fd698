// Authoritative game state captured once per planning cycle
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SNAPSHOT_SOURCE: &str = "SpaceTraders";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub source: String,
    /// Agent record, passed through untouched.
    pub agent: Option<Value>,
    /// First page of ship records as returned by the API.
    pub ships: Option<Vec<Value>>,
    pub errors: Vec<String>,
}

impl StateSnapshot {
    pub fn empty() -> Self {
        Self {
            source: SNAPSHOT_SOURCE.to_string(),
            agent: None,
            ships: None,
            errors: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn ship_count(&self) -> usize {
        self.ships.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FleetReadiness {
    pub total_ships: usize,
    pub idle_ships: usize,
    pub busy_ships: usize,
    pub ready_for_action: bool,
}

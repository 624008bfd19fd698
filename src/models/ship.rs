use serde::Deserialize;
use serde_json::Value;

/// The slice of a ship record the control loop cares about. Everything else in
/// the payload stays opaque.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ShipStatusView {
    #[serde(default)]
    pub nav: Option<ShipNavView>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ShipNavView {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavActivity {
    Idle,
    Busy,
}

impl ShipStatusView {
    /// Lenient extraction: malformed records yield a view with no status.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    pub fn nav_status(&self) -> Option<&str> {
        self.nav.as_ref().and_then(|nav| nav.status.as_deref())
    }

    /// DOCKED/ANCHORED are idle, IN_TRANSIT or a missing status is busy and
    /// anything unrecognised counts as idle.
    pub fn activity(&self) -> NavActivity {
        let status = self.nav_status().unwrap_or("").trim().to_uppercase();
        match status.as_str() {
            "DOCKED" | "ANCHORED" => NavActivity::Idle,
            "IN_TRANSIT" | "" => NavActivity::Busy,
            _ => NavActivity::Idle,
        }
    }
}

// State refresh - pulls agent and fleet data into a snapshot
use async_trait::async_trait;

use crate::client::build_client;
use crate::config::ApiSettings;
use crate::models::StateSnapshot;

pub const NO_CREDENTIAL_ERROR: &str = "no credential configured";

/// Anything that can produce the authoritative state for one planning cycle.
/// Implementations never fail; problems land in `StateSnapshot::errors`.
#[async_trait]
pub trait StateSource: Send + Sync {
    async fn refresh_state(&self) -> StateSnapshot;
}

pub struct StateRefresher {
    settings: ApiSettings,
}

impl StateRefresher {
    pub fn new(settings: ApiSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl StateSource for StateRefresher {
    async fn refresh_state(&self) -> StateSnapshot {
        let mut snapshot = StateSnapshot::empty();

        let Some(client) = build_client(None, &self.settings) else {
            snapshot.errors.push(NO_CREDENTIAL_ERROR.to_string());
            return snapshot;
        };

        let agent = client.fetch_my_agent().await;
        if agent.ok && agent.json.is_some() {
            snapshot.agent = agent.data().cloned();
        } else {
            snapshot.errors.push(format!("agent: {}", agent.failure_reason()));
        }

        let ships = client.fetch_my_ships(1, self.settings.ships_page_size).await;
        if ships.ok && ships.json.is_some() {
            snapshot.ships = ships.data().and_then(|data| data.as_array().cloned());
        } else {
            snapshot.errors.push(format!("ships: {}", ships.failure_reason()));
        }

        if snapshot.is_complete() {
            tracing::debug!(
                "📊 State refreshed (agent={}, ships={})",
                snapshot.agent.is_some(),
                snapshot.ship_count()
            );
        }
        snapshot
    }
}

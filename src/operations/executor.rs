// Intent execution - dispatch point for game actions
use crate::client::build_client;
use crate::config::ApiSettings;
use crate::models::{Intent, IntentType};
use crate::storage::{now_ts, AgentStore, StorageError};

pub struct IntentExecutor {
    settings: ApiSettings,
}

impl IntentExecutor {
    pub fn new(settings: ApiSettings) -> Self {
        Self { settings }
    }

    /// Records what would be done for `intent`. Without a credential this is a
    /// silent no-op; only store misuse is reported.
    pub fn execute_intent(&self, intent: &Intent, store: &AgentStore) -> Result<(), StorageError> {
        let Some(_client) = build_client(None, &self.settings) else {
            tracing::warn!("⚠️ No SpaceTraders client available; skipping execution of {}", intent.summary());
            return Ok(());
        };

        let message = match intent.intent_type {
            IntentType::GatherMarketData => "gather_market_data",
            IntentType::Explore => "explore (TODO)",
            IntentType::Reposition => "reposition (TODO)",
            IntentType::Trade => "trade (TODO)",
        };
        store.append_log(&now_ts(), "execute", message)?;
        tracing::info!("⚙️ Executed intent {} -> {}", intent.intent_type, message);
        Ok(())
    }
}

// Advisory-driven loop - refresh, plan and execute whenever the advisory changes
use std::time::Duration;

use super::{read_advisory, seconds};
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::models::FleetReadiness;
use crate::operations::{analyze_fleet_readiness, IntentExecutor, StateSource};
use crate::reasoning::IntentPlanner;
use crate::storage::{now_ts, AgentStore, StorageError};

/// What one tick did and how long to sleep before the next.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryTick {
    pub acted: bool,
    pub readiness: Option<FleetReadiness>,
    pub next_sleep: Duration,
}

pub struct AdvisoryLoop<S: StateSource> {
    config: AgentConfig,
    store: AgentStore,
    state: S,
    planner: IntentPlanner,
    executor: IntentExecutor,
    last_seen: Option<String>,
}

impl<S: StateSource> AdvisoryLoop<S> {
    /// `store` must already be connected.
    pub fn new(config: AgentConfig, store: AgentStore, state: S, planner: IntentPlanner) -> Self {
        let executor = IntentExecutor::new(config.api.clone());
        Self {
            config,
            store,
            state,
            planner,
            executor,
            last_seen: None,
        }
    }

    pub fn store(&self) -> &AgentStore {
        &self.store
    }

    /// The stretched interval used after a tick in which no ship was idle.
    pub fn busy_interval(&self) -> Duration {
        let timing = &self.config.timing;
        seconds(
            (timing.poll_interval_seconds * timing.busy_multiplier)
                .min(timing.max_poll_interval_seconds),
        )
    }

    pub async fn tick(&mut self) -> Result<AdvisoryTick, AgentError> {
        let base_sleep = seconds(self.config.timing.poll_interval_seconds);
        let advisory = read_advisory(&self.config.paths.input);

        if advisory == self.last_seen {
            return Ok(AdvisoryTick {
                acted: false,
                readiness: None,
                next_sleep: base_sleep,
            });
        }
        tracing::info!("📄 Advisory changed; planning next intent");
        self.last_seen = advisory.clone();

        let snapshot = self.state.refresh_state().await;
        let payload = serde_json::to_string(&snapshot).map_err(StorageError::from)?;
        self.store.save_state_snapshot(&now_ts(), &payload)?;

        if let Some(text) = advisory.as_deref() {
            self.store.append_log(&now_ts(), "advisory", text)?;
        }

        let readiness = analyze_fleet_readiness(&snapshot);
        tracing::info!(
            "🚢 Fleet: {} ships, {} idle, {} busy",
            readiness.total_ships,
            readiness.idle_ships,
            readiness.busy_ships
        );

        let notes = self.store.fetch_strategy_notes()?.map(|n| n.content);
        let intent = self
            .planner
            .plan_next_intent(Some(&snapshot), notes.as_deref(), advisory.as_deref())
            .await;
        let summary = intent.summary();
        tracing::info!("🎯 Intent: {}", summary);
        self.store.append_log(&now_ts(), "intent", &summary)?;

        self.executor.execute_intent(&intent, &self.store)?;

        if snapshot.errors.is_empty() {
            self.store.clear_error_context()?;
        } else {
            let message = snapshot.errors.join("; ");
            tracing::warn!("⚠️ State refresh incomplete: {}", message);
            self.store.save_error_context(
                &now_ts(),
                Some(&summary),
                &message,
                &serde_json::to_string(&snapshot.errors).map_err(StorageError::from)?,
            )?;
        }

        let next_sleep = if readiness.ready_for_action {
            base_sleep
        } else {
            tracing::info!("😴 No idle ships; backing off");
            self.busy_interval()
        };

        Ok(AdvisoryTick {
            acted: true,
            readiness: Some(readiness),
            next_sleep,
        })
    }

    /// Runs until interrupted, or for exactly one tick when `once` is set.
    pub async fn run(&mut self, once: bool) -> Result<(), AgentError> {
        tracing::info!(
            "🚀 Advisory loop watching {} every {:.1}s",
            self.config.paths.input.display(),
            self.config.timing.poll_interval_seconds
        );
        loop {
            let outcome = self.tick().await?;
            if once {
                return Ok(());
            }
            tokio::time::sleep(outcome.next_sleep).await;
        }
    }
}

// SpaceTraders Intent Agent Library
// Polling control loops that plan and act through an LLM

pub mod admiral;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod operations;
pub mod reasoning;
pub mod storage;
pub mod verbosity;

// Re-export commonly used types
pub use admiral::{run_tool_mode, AdvisoryLoop, ToolLoop};
pub use client::SpaceTradersClient;
pub use config::AgentConfig;
pub use error::AgentError;
pub use models::{FleetReadiness, Intent, IntentType, StateSnapshot};
pub use storage::AgentStore;

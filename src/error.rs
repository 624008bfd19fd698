// Fatal error tier: conditions that stop the agent
use crate::client::llm::LlmError;
use crate::client::tools::ToolError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("missing SpaceTraders credential: set {0}")]
    MissingCredential(&'static str),

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("tool catalog failure: {0}")]
    Tools(#[from] ToolError),

    #[error("LLM backend failure: {0}")]
    Llm(#[from] LlmError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

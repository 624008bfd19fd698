// Client module - SpaceTraders REST gateway, LLM backends and tool catalog
pub mod api;
pub mod llm;
pub mod tools;

pub use api::{build_client, SpaceTradersClient};
pub use llm::{build_backend, ChatBackend, ChatMessage, LlmError, ToolCall};
pub use tools::{ApiToolInvoker, ToolCatalog, ToolError, ToolInvoker, ToolResponse};

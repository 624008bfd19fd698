use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE_URL: &str = "https://api.spacetraders.io/v2";
pub const DEFAULT_OPENAPI_SPEC_URL: &str =
    "https://raw.githubusercontent.com/SpaceTradersAPI/api-docs/refs/heads/main/reference/SpaceTraders.json";
pub const AGENT_TOKEN_FILE: &str = "AGENT_TOKEN";

pub const ENV_API_KEY: &str = "SPACETRADERS_API_KEY";
pub const ENV_LOG_API: &str = "LOG_API";
pub const ENV_LLM_MODEL: &str = "OPENAI_MODEL";
pub const ENV_LLM_BASE: &str = "OPENAI_API_BASE";
pub const ENV_LLM_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OLLAMA_MODEL: &str = "OLLAMA_MODEL";
pub const ENV_LLM_BACKEND: &str = "LLM_BACKEND";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub paths: PathsConfig,
    pub timing: TimingConfig,
    pub api: ApiSettings,
    pub llm: LlmSettings,
    pub tools: ToolSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Advisory text file, re-read every tick
    pub input: PathBuf,
    /// SQLite database file
    pub database: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Base delay between ticks in seconds
    pub poll_interval_seconds: f64,
    /// Factor applied to the poll interval while no ship is idle
    pub busy_multiplier: f64,
    /// Ceiling for the stretched poll interval in seconds
    pub max_poll_interval_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    /// Bearer token; `None` disables every REST-backed feature
    pub token: Option<String>,
    /// Log every request and response body
    pub log_api: bool,
    pub timeout_seconds: u64,
    pub ships_page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmBackendKind {
    /// `POST {base_url}/chat/completions`
    OpenaiCompatible,
    /// Native `POST {base_url}/api/chat`
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub enabled: bool,
    pub backend: LlmBackendKind,
    pub model: String,
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
    /// Log outbound prompts and raw replies
    pub prompt_debug: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// OpenAPI document, as a URL or a local file path
    pub spec_source: String,
    /// Operations never offered to the model
    pub excluded: Vec<String>,
    /// Log entries included in the tool-selection prompt
    pub history_limit: usize,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input.md"),
            database: PathBuf::from("agent.db"),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 5.0,
            busy_multiplier: 2.0,
            max_poll_interval_seconds: 60.0,
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            token: None,
            log_api: false,
            timeout_seconds: 30,
            ships_page_size: 20,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: LlmBackendKind::OpenaiCompatible,
            model: "mistral-nemo".to_string(),
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: "ollama".to_string(),
            timeout_seconds: 120,
            prompt_debug: false,
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            spec_source: DEFAULT_OPENAPI_SPEC_URL.to_string(),
            excluded: vec!["register".to_string()],
            history_limit: 10,
        }
    }
}

fn env_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1")
}

impl AgentConfig {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create(config_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if config_path.exists() {
            tracing::info!("📋 Loading configuration from {}", config_path.display());
            let config_str = fs::read_to_string(config_path)?;
            let config: AgentConfig = toml::from_str(&config_str)?;
            Ok(config)
        } else {
            tracing::info!("📋 Creating default configuration at {}", config_path.display());
            let config = AgentConfig::default();
            config.save(config_path)?;
            tracing::info!("💡 Edit {} to customize agent behavior", config_path.display());
            Ok(config)
        }
    }

    pub fn save(&self, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let config_str = toml::to_string_pretty(self)?;
        fs::write(config_path, config_str)?;
        Ok(())
    }

    /// Applies environment overrides through `lookup` so callers decide where
    /// variables come from. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_API_KEY) {
            self.api.token = Some(token.trim().to_string());
        }
        if let Some(flag) = get(ENV_LOG_API) {
            self.api.log_api = env_flag(&flag);
        }
        if let Some(backend) = get(ENV_LLM_BACKEND) {
            match backend.trim().to_lowercase().as_str() {
                "ollama" => self.llm.backend = LlmBackendKind::Ollama,
                "openai" | "openai_compatible" => self.llm.backend = LlmBackendKind::OpenaiCompatible,
                other => tracing::warn!("⚠️ Ignoring unknown {}={}", ENV_LLM_BACKEND, other),
            }
        }
        if let Some(model) = get(ENV_LLM_MODEL) {
            self.llm.model = model;
        }
        if self.llm.backend == LlmBackendKind::Ollama {
            if let Some(model) = get(ENV_OLLAMA_MODEL) {
                self.llm.model = model;
            }
        }
        if let Some(base) = get(ENV_LLM_BASE) {
            self.llm.base_url = base;
        }
        if let Some(key) = get(ENV_LLM_KEY) {
            self.llm.api_key = key;
        }
    }

    /// Falls back to the token file when no credential came from config or env.
    pub fn apply_token_file(&mut self, token_path: &Path) {
        if self.api.token.is_some() {
            return;
        }
        if let Ok(contents) = fs::read_to_string(token_path) {
            let token = contents.trim();
            if !token.is_empty() {
                tracing::info!("🔑 Using credential from {}", token_path.display());
                self.api.token = Some(token.to_string());
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let timing = &self.timing;
        if !(timing.poll_interval_seconds.is_finite() && timing.poll_interval_seconds > 0.0) {
            return Err("poll_interval_seconds must be a finite number greater than 0".to_string());
        }
        if !(timing.busy_multiplier.is_finite() && timing.busy_multiplier >= 1.0) {
            return Err("busy_multiplier must be a finite number of at least 1.0".to_string());
        }
        if !(timing.max_poll_interval_seconds.is_finite() && timing.max_poll_interval_seconds > 0.0) {
            return Err("max_poll_interval_seconds must be a finite number greater than 0".to_string());
        }
        if self.llm.model.trim().is_empty() {
            return Err("llm.model must not be empty".to_string());
        }
        if self.api.ships_page_size == 0 {
            return Err("ships_page_size must be greater than 0".to_string());
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    pub fn print_summary(&self) {
        tracing::info!("📋 Configuration Summary:");
        tracing::info!("   📄 Advisory input: {}", self.paths.input.display());
        tracing::info!("   💾 Database: {}", self.paths.database.display());
        tracing::info!("   ⏰ Poll interval: {:.1}s", self.timing.poll_interval_seconds);
        tracing::info!(
            "   🔑 SpaceTraders credential: {}",
            if self.api.token.is_some() { "configured" } else { "missing" }
        );
        tracing::info!(
            "   🧠 LLM: {} via {:?} at {} ({})",
            self.llm.model,
            self.llm.backend,
            self.llm.base_url,
            if self.llm.enabled { "enabled" } else { "disabled" }
        );
    }
}

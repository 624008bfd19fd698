// SpaceTraders Intent Agent - Main Entry Point
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use spacetraders_intent_agent::admiral::{run_tool_mode, AdvisoryLoop};
use spacetraders_intent_agent::client::build_backend;
use spacetraders_intent_agent::config::{AgentConfig, AGENT_TOKEN_FILE};
use spacetraders_intent_agent::error::AgentError;
use spacetraders_intent_agent::operations::StateRefresher;
use spacetraders_intent_agent::reasoning::IntentPlanner;
use spacetraders_intent_agent::storage::AgentStore;
use spacetraders_intent_agent::verbosity::init_logging;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Plan and execute an intent whenever the advisory file changes
    Advisory,
    /// Let the LLM call SpaceTraders API operations directly
    Tools,
}

#[derive(Parser, Debug)]
#[command(name = "spacetraders-agent")]
#[command(about = "LLM-driven SpaceTraders polling agent")]
struct Cli {
    /// Advisory input file
    #[arg(long)]
    input: Option<PathBuf>,

    /// Seconds between ticks
    #[arg(long)]
    poll_interval: Option<f64>,

    /// Run a single tick and exit
    #[arg(long)]
    once: bool,

    /// DEBUG, INFO, WARNING or ERROR (RUST_LOG overrides)
    #[arg(long, default_value = "INFO")]
    log_level: String,

    #[arg(long, value_enum, default_value_t = Mode::Advisory)]
    mode: Mode,

    /// TOML configuration file (created with defaults if missing)
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log every prompt sent to the LLM
    #[arg(long)]
    prompt_debug: bool,

    /// Skip the LLM and always use the fallback intent
    #[arg(long)]
    no_llm: bool,
}

fn build_config(cli: &Cli) -> Result<AgentConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => AgentConfig::load_or_create(path)?,
        None => AgentConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok());
    config.apply_token_file(Path::new(AGENT_TOKEN_FILE));

    if let Some(input) = &cli.input {
        config.paths.input = input.clone();
    }
    if let Some(db) = &cli.db {
        config.paths.database = db.clone();
    }
    if let Some(interval) = cli.poll_interval {
        config.timing.poll_interval_seconds = interval;
    }
    if cli.prompt_debug {
        config.llm.prompt_debug = true;
    }
    if cli.no_llm {
        config.llm.enabled = false;
    }

    config.validate().map_err(AgentError::Config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    tracing::info!("🚀 SpaceTraders Intent Agent starting ({:?} mode)", cli.mode);
    let config = build_config(&cli)?;
    config.print_summary();

    let mut store = AgentStore::new(&config.paths.database);
    store.connect().map_err(AgentError::from)?;

    let result = match cli.mode {
        Mode::Advisory => {
            let backend = build_backend(&config.llm)?;
            if backend.is_none() {
                tracing::info!("🧠 LLM disabled; planner will use the fallback intent");
            }
            let planner = IntentPlanner::new(backend, config.llm.prompt_debug);
            let refresher = StateRefresher::new(config.api.clone());
            let mut advisory_loop = AdvisoryLoop::new(config, store, refresher, planner);
            advisory_loop.run(cli.once).await
        }
        Mode::Tools => run_tool_mode(config, store, cli.once).await,
    };

    if let Err(e) = result {
        tracing::error!("❌ Agent stopped: {}", e);
        return Err(e.into());
    }
    tracing::info!("🏁 Agent finished");
    Ok(())
}

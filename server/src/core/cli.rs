use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::ExhaustionPolicy;
use super::constants::{
    ENV_CONFIG, ENV_DEBUG, ENV_HOST, ENV_LLM_BASE_URL, ENV_LLM_MODEL, ENV_LLM_TIMEOUT_SECS,
    ENV_MAX_ATTEMPTS, ENV_ON_EXHAUSTED, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "querygenie")]
#[command(version, about = "Filter tabular data with natural-language queries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug mode (logs generated filters and prompts)
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// OpenAI-compatible API base URL
    #[arg(long, global = true, env = ENV_LLM_BASE_URL)]
    pub llm_base_url: Option<String>,

    /// Model used to translate queries into filters
    #[arg(long, short = 'm', global = true, env = ENV_LLM_MODEL)]
    pub model: Option<String>,

    /// Timeout for a single LLM call in seconds
    #[arg(long, global = true, env = ENV_LLM_TIMEOUT_SECS)]
    pub llm_timeout_secs: Option<u64>,

    /// Number of attempts to obtain a valid filter from the LLM
    #[arg(long, global = true, env = ENV_MAX_ATTEMPTS)]
    pub max_attempts: Option<u32>,

    /// Behavior when no valid filter is produced (fail or unfiltered)
    #[arg(long, global = true, env = ENV_ON_EXHAUSTED, value_parser = parse_exhaustion_policy)]
    pub on_exhausted: Option<ExhaustionPolicy>,
}

/// Parse exhaustion policy from CLI/env string
fn parse_exhaustion_policy(s: &str) -> Result<ExhaustionPolicy, String> {
    match s.to_lowercase().as_str() {
        "fail" => Ok(ExhaustionPolicy::Fail),
        "unfiltered" => Ok(ExhaustionPolicy::Unfiltered),
        _ => Err(format!(
            "Invalid exhaustion policy '{}'. Valid options: fail, unfiltered",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Print the system prompt sent to the LLM for the given column headers
    Prompt {
        /// Column headers, in order
        #[arg(required = true)]
        headers: Vec<String>,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub llm_base_url: Option<String>,
    pub model: Option<String>,
    pub llm_timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub on_exhausted: Option<ExhaustionPolicy>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        debug: cli.debug,
        config: cli.config,
        llm_base_url: cli.llm_base_url,
        model: cli.model,
        llm_timeout_secs: cli.llm_timeout_secs,
        max_attempts: cli.max_attempts,
        on_exhausted: cli.on_exhausted,
    };
    (config, cli.command)
}

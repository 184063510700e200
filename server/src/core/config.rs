use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL,
    DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_PORT, ENV_LLM_API_KEY,
    MAX_ATTEMPTS_LIMIT,
};
use super::secret::Secret;

// =============================================================================
// Exhaustion Policy Enum
// =============================================================================

/// What to do when the LLM never produces a usable filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExhaustionPolicy {
    /// Fail the request with a server error
    #[default]
    Fail,
    /// Fall back to an empty filter set (all rows returned)
    Unfiltered,
}

impl fmt::Display for ExhaustionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExhaustionPolicy::Fail => write!(f, "fail"),
            ExhaustionPolicy::Unfiltered => write!(f, "unfiltered"),
        }
    }
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// LLM configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LlmFileConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub on_exhausted: Option<ExhaustionPolicy>,
}

/// CORS configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CorsFileConfig {
    /// Allowed origins; `"*"` allows any origin
    pub allowed_origins: Option<Vec<String>>,
}

/// Root of the JSON config file
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub llm: Option<LlmFileConfig>,
    pub cors: Option<CorsFileConfig>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// LLM backend and filter generation configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Secret,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub on_exhausted: ExhaustionPolicy,
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// True when any origin is accepted
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub cors: CorsConfig,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Local directory config OR CLI-specified config path
    /// 3. CLI arguments (which include env var fallbacks via clap)
    ///
    /// The API key always comes from the process environment.
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let config_path = if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        let file_config = match config_path {
            Some(path) => {
                let config = FileConfig::load_from_file(&path)?;
                config.warn_unknown_fields();
                config
            }
            None => FileConfig::default(),
        };

        let api_key = std::env::var(ENV_LLM_API_KEY).ok();
        Self::from_sources(cli, file_config, api_key)
    }

    /// Layer defaults, file config, and CLI/env overrides
    pub fn from_sources(
        cli: &CliConfig,
        file_config: FileConfig,
        api_key: Option<String>,
    ) -> Result<Self> {
        let file_server = file_config.server.unwrap_or_default();
        let file_llm = file_config.llm.unwrap_or_default();
        let file_cors = file_config.cors.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let api_key = match api_key {
            Some(key) if !key.trim().is_empty() => Secret::new(key.trim()),
            _ => anyhow::bail!(
                "{} not found. Add your LLM provider API key to the environment or a .env file.",
                ENV_LLM_API_KEY
            ),
        };

        let llm = LlmConfig {
            base_url: cli
                .llm_base_url
                .clone()
                .or(file_llm.base_url)
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: cli
                .model
                .clone()
                .or(file_llm.model)
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            api_key,
            timeout_secs: cli
                .llm_timeout_secs
                .or(file_llm.timeout_secs)
                .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS),
            max_attempts: cli
                .max_attempts
                .or(file_llm.max_attempts)
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
            on_exhausted: cli
                .on_exhausted
                .or(file_llm.on_exhausted)
                .unwrap_or_default(),
        };

        let cors = CorsConfig {
            allowed_origins: file_cors
                .allowed_origins
                .unwrap_or_else(|| vec!["*".to_string()]),
        };

        // debug: CLI/env flag takes precedence, then file config, default false
        let debug = cli.debug || file_config.debug.unwrap_or(false);

        let config = Self {
            server: ServerConfig { host, port },
            llm,
            cors,
            debug,
        };

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            model = %config.llm.model,
            max_attempts = config.llm.max_attempts,
            on_exhausted = %config.llm.on_exhausted,
            "Configuration loaded"
        );

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would bind a random port
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.llm.base_url.is_empty() {
            anyhow::bail!("Configuration error: llm.base_url must not be empty");
        }

        if self.llm.model.is_empty() {
            anyhow::bail!("Configuration error: llm.model must not be empty");
        }

        if self.llm.timeout_secs == 0 {
            anyhow::bail!("Configuration error: llm.timeout_secs must be greater than 0");
        }

        if self.llm.max_attempts == 0 || self.llm.max_attempts > MAX_ATTEMPTS_LIMIT {
            anyhow::bail!(
                "Configuration error: llm.max_attempts must be between 1 and {}",
                MAX_ATTEMPTS_LIMIT
            );
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("cors.allowed_origins is empty, browser clients will be rejected");
        }

        Ok(())
    }
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

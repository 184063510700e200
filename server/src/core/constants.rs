// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "CSV Query Genie";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "querygenie";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name (looked up in the working directory)
pub const CONFIG_FILE_NAME: &str = "querygenie.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "QUERYGENIE_CONFIG";

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "QUERYGENIE_DEBUG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "QUERYGENIE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "QUERYGENIE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "QUERYGENIE_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8000;

/// Default request body limit (uploaded datasets travel in the body)
pub const DEFAULT_BODY_LIMIT: usize = 32 * 1024 * 1024;

// =============================================================================
// Environment Variables - LLM
// =============================================================================

/// Environment variable holding the LLM provider API key (required)
pub const ENV_LLM_API_KEY: &str = "GROQ_API_KEY";

/// Environment variable for the OpenAI-compatible base URL
pub const ENV_LLM_BASE_URL: &str = "QUERYGENIE_LLM_BASE_URL";

/// Environment variable for the model name
pub const ENV_LLM_MODEL: &str = "QUERYGENIE_MODEL";

/// Environment variable for the per-attempt timeout
pub const ENV_LLM_TIMEOUT_SECS: &str = "QUERYGENIE_LLM_TIMEOUT_SECS";

/// Environment variable for the attempt budget
pub const ENV_MAX_ATTEMPTS: &str = "QUERYGENIE_MAX_ATTEMPTS";

/// Environment variable for the exhaustion policy
pub const ENV_ON_EXHAUSTED: &str = "QUERYGENIE_ON_EXHAUSTED";

// =============================================================================
// LLM Defaults
// =============================================================================

/// Default OpenAI-compatible endpoint (Groq)
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model used for filter generation
pub const DEFAULT_LLM_MODEL: &str = "openai/gpt-oss-20b";

/// Default per-attempt timeout in seconds
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// TCP connect timeout for the LLM endpoint
pub const LLM_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default number of generation attempts (initial call plus corrections)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Upper bound accepted for the attempt budget
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

//! Core application infrastructure

pub(crate) mod banner;
pub mod cli;
pub mod config;
pub mod constants;
pub mod secret;
pub mod shutdown;

pub use crate::app::CoreApp;
pub use cli::{CliConfig, Commands};
pub use config::{AppConfig, ExhaustionPolicy, LlmConfig, ServerConfig};
pub use secret::Secret;
pub use shutdown::ShutdownService;

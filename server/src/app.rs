//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::llm::{LlmBackend, OpenAiClient};
use crate::domain::QueryService;
use crate::domain::query::{FilterGenerator, build_system_prompt};

pub struct CoreApp {
    pub config: AppConfig,
    pub shutdown: ShutdownService,
    pub service: Arc<QueryService>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Prompt { headers }) => {
                println!("{}", build_system_prompt(&headers));
                return Ok(());
            }
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config)?;
        Self::start_server(app).await
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        // One client for the process lifetime, shared by every request
        let client = OpenAiClient::new(&config.llm).context("Failed to initialize LLM client")?;
        tracing::debug!(
            backend = client.backend_name(),
            model = client.model(),
            "LLM client initialized"
        );
        let backend: Arc<dyn LlmBackend> = Arc::new(client);

        let generator = FilterGenerator::from_config(backend, &config.llm).with_debug(config.debug);
        let service = Arc::new(QueryService::new(generator));

        Ok(Self {
            config,
            shutdown: ShutdownService::new(),
            service,
        })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        banner::print_banner(&app.config);

        let Self {
            config,
            shutdown,
            service,
        } = app;

        ApiServer::new(
            config.server.host,
            config.server.port,
            config.cors,
            service,
            shutdown,
        )
        .start()
        .await?;

        tracing::debug!("Shutdown complete");
        Ok(())
    }
}

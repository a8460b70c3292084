use std::env;

use opsched_server::config::loader::load_config;
use opsched_server::{AppState, ServerBuilder};
use opsched_storage::ScheduleStore;

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From OPSCHED_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (opsched.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (OPSCHED_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config"
            && let Some(path) = args.next()
        {
            return (path, ConfigSource::CliArgument);
        }
    }
    if let Ok(path) = env::var("OPSCHED_CONFIG") {
        return (path, ConfigSource::EnvironmentVariable);
    }
    ("opsched.toml".to_string(), ConfigSource::Default)
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else) so local development
    // can configure through environment variables.
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist - it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    // Initialize tracing early with the default level
    opsched_server::observability::init_tracing();

    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    // Apply the configured logging level
    opsched_server::observability::apply_logging_level(&cfg.logging.level);

    let state = AppState::in_memory();
    tracing::info!(
        backend = %state.schedules.backend_name(),
        "Storage initialized"
    );

    let server = ServerBuilder::new()
        .with_config(cfg)
        .with_state(state)
        .build();

    if let Err(e) = server.run().await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}

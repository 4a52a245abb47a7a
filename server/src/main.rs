//! jobtrack-server: HTTP API for the job application tracker.

mod routes;
mod state;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use jobtrack::config::validate_config;
use jobtrack::{load_config, Config, LogFormat};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use routes::create_router;
use state::AppState;

const DEFAULT_LOG_FILTER: &str = "jobtrack=info,jobtrack_server=info";

#[derive(Parser)]
#[command(name = "jobtrack-server")]
#[command(about = "Track job applications, their statuses and attached documents")]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long, env = "JOBTRACK_CONFIG", default_value = "jobtrack.json")]
    config: PathBuf,

    /// SQLite database file (overrides config and environment)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Directory for uploaded documents (overrides config and environment)
    #[arg(long)]
    uploads: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:3000
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, from_file) = resolve_config(&cli)?;
    init_tracing(config.log_format)?;

    if from_file {
        info!(path = %cli.config.display(), "Loaded configuration");
    } else {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }
    info!(
        database = %config.database_path.display(),
        uploads = %config.uploads_path.display(),
        "Opening stores"
    );

    let state = AppState::open(&config)
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("binding {}", config.bind_address))?;
    info!("Listening on http://{}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Config file (if present), then environment, then command-line flags.
/// Returns the config and whether it came from a file.
fn resolve_config(cli: &Cli) -> jobtrack::Result<(Config, bool)> {
    let from_file = Path::new(&cli.config).exists();
    let mut config = if from_file {
        load_config(&cli.config)?
    } else {
        Config::default()
    };

    config.apply_env_overrides();
    if let Some(database) = &cli.database {
        config.database_path = database.clone();
    }
    if let Some(uploads) = &cli.uploads {
        config.uploads_path = uploads.clone();
    }
    if let Some(bind) = &cli.bind {
        config.bind_address = bind.clone();
    }

    validate_config(&config)?;
    Ok((config, from_file))
}

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => tracing::subscriber::set_global_default(registry.with(fmt::layer()))?,
        LogFormat::Json => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().json()))?
        }
    }

    // The db layer logs through the `log` facade.
    tracing_log::LogTracer::init()?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

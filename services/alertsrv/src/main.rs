//! Heartbeat Alert Service (`alertsrv`)
//!
//! Contact registry, heartbeat ingestion with SMS fan-out, and sensor batch
//! storage behind one HTTP/WebSocket API.

use std::path::PathBuf;

use axum::serve;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use alertsrv::{
    bootstrap::{self, create_service_info},
    config::AlertsrvConfig,
    create_routes, AlertSrvError,
};
use common::shutdown::shutdown_on_signal;
use errors::{CaneError, CaneResult};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "AlertSrv - heartbeat alert service")]
struct Args {
    /// Configuration file (default: config/alertsrv.yaml when present)
    #[arg(short, long, value_name = "FILE", env = "ALERTSRV_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database path
    #[arg(long, value_name = "PATH")]
    db_path: Option<String>,

    /// Bind address (host:port)
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<String>,

    /// Disable colored console output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Validate configuration and database connectivity, then exit
    Check,
}

#[tokio::main]
async fn main() -> CaneResult<()> {
    let args = Args::parse();
    let service_info = create_service_info();

    common::service_bootstrap::load_development_env();

    let config = bootstrap::load_configuration(
        &service_info,
        args.config.as_deref(),
        args.db_path.as_deref(),
        args.bind.as_deref(),
    )?;

    bootstrap::init_environment(&service_info, &config, !args.no_color)?;

    if let Err(e) = config.validate() {
        error!("{}", e);
        return Err(e.into());
    }

    match args.command {
        Some(Commands::Check) => check_config(config).await?,
        None => run_service(config).await?,
    }
    Ok(())
}

/// `alertsrv check`
async fn check_config(config: AlertsrvConfig) -> Result<(), AlertSrvError> {
    let sqlite_client = bootstrap::setup_database(&config).await?;
    sqlite_client.ping().await?;
    let gateway = bootstrap::create_gateway(&config)?;

    info!("Configuration OK");
    info!("  bind address:     {}", config.bind_address());
    info!("  database:         {}", sqlite_client.path());
    info!("  sms gateway:      {}", gateway.name());
    info!(
        "  thresholds:       http < {}, stream < {}",
        config.alert.http_threshold, config.alert.stream_threshold
    );
    info!(
        "  fan-out:          {} concurrent, {}s timeout",
        config.alert.fanout_concurrency, config.alert.dispatch_timeout_secs
    );
    Ok(())
}

async fn run_service(config: AlertsrvConfig) -> CaneResult<()> {
    let sqlite_client = bootstrap::setup_database(&config).await?;
    let gateway = bootstrap::create_gateway(&config)?;

    let bind_address = config.bind_address();
    let state = bootstrap::build_state(config, sqlite_client, gateway).await?;
    let app = create_routes(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .map_err(|e| CaneError::StartupFailed(format!("Failed to bind to {}: {}", bind_address, e)))?;

    info!("API server listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    let shutdown_token = CancellationToken::new();
    serve(listener, app)
        .with_graceful_shutdown(shutdown_on_signal(shutdown_token))
        .await
        .map_err(|e| CaneError::Internal(format!("Server error: {}", e)))?;

    info!("AlertSrv stopped");
    Ok(())
}

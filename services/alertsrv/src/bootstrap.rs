//! Service Bootstrap and Initialization
//!
//! Handles service initialization: logging, configuration, database and
//! component wiring.

use common::service_bootstrap::{get_service_port, ServiceInfo};
use common::sqlite::SqliteClient;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::app_state::AppState;
use crate::config::{AlertsrvConfig, DEFAULT_PORT};
use crate::contacts::ContactStore;
use crate::error::{AlertSrvError, Result};
use crate::notify::{NotificationGateway, TwilioGateway};
use crate::pipeline::AlertPipeline;
use crate::sensor::SensorStore;

/// Service info for the startup banner and port resolution
pub fn create_service_info() -> ServiceInfo {
    ServiceInfo::new(
        "alertsrv",
        env!("CARGO_PKG_VERSION"),
        "Heartbeat Alert Service - Contacts, SMS Fan-out & Sensor Ingestion",
        DEFAULT_PORT,
    )
}

/// Initialize logging and print the banner
pub fn init_environment(
    service_info: &ServiceInfo,
    config: &AlertsrvConfig,
    ansi: bool,
) -> Result<()> {
    common::service_bootstrap::init_logging(
        service_info,
        config.logging.dir.as_deref(),
        Some(&config.logging.level),
        ansi,
    )
    .map_err(|e| AlertSrvError::config(format!("Failed to initialize logging: {}", e)))?;

    common::service_bootstrap::print_startup_banner(service_info);
    info!("AlertSrv starting");
    Ok(())
}

/// Load configuration, apply CLI overrides and environment port overrides
pub fn load_configuration(
    service_info: &ServiceInfo,
    config_path: Option<&Path>,
    db_path: Option<&str>,
    bind: Option<&str>,
) -> Result<AlertsrvConfig> {
    let mut config = AlertsrvConfig::load(config_path)?;

    if let Some(db_path) = db_path {
        config.database.path = db_path.to_string();
    }

    match bind {
        Some(bind) => {
            let (host, port) = parse_bind(bind)?;
            config.api.host = host;
            config.api.port = port;
        },
        None => config.api.port = get_service_port(config.api.port, service_info),
    }

    Ok(config)
}

/// Split `host:port`
fn parse_bind(bind: &str) -> Result<(String, u16)> {
    let (host, port) = bind
        .rsplit_once(':')
        .ok_or_else(|| AlertSrvError::config(format!("Invalid bind address: {}", bind)))?;
    let port = port
        .parse::<u16>()
        .map_err(|_| AlertSrvError::config(format!("Invalid port in bind address: {}", bind)))?;
    if host.is_empty() {
        return Err(AlertSrvError::config(format!(
            "Missing host in bind address: {}",
            bind
        )));
    }
    Ok((host.to_string(), port))
}

/// Open the database and create tables
pub async fn setup_database(config: &AlertsrvConfig) -> Result<SqliteClient> {
    let client = SqliteClient::new(&config.database.path).await?;
    info!("Database ready: {}", client.path());
    Ok(client)
}

/// Create the production SMS gateway
pub fn create_gateway(config: &AlertsrvConfig) -> Result<Arc<dyn NotificationGateway>> {
    let gateway = TwilioGateway::new(&config.sms)?;
    info!("SMS gateway: {} ({})", gateway.name(), gateway.messages_url());
    Ok(Arc::new(gateway))
}

/// Wire stores, pipeline and state
///
/// Tables are created idempotently before the state is returned.
pub async fn build_state(
    config: AlertsrvConfig,
    sqlite_client: SqliteClient,
    gateway: Arc<dyn NotificationGateway>,
) -> Result<Arc<AppState>> {
    let contacts = ContactStore::new(sqlite_client.pool().clone());
    contacts.init_schema().await?;

    let sensors = SensorStore::new(sqlite_client.pool().clone());
    sensors.init_schema().await?;

    let pipeline = Arc::new(AlertPipeline::new(
        contacts.clone(),
        gateway,
        config.alert.clone(),
    ));

    Ok(Arc::new(AppState::new(
        Arc::new(config),
        sqlite_client,
        contacts,
        sensors,
        pipeline,
    )))
}

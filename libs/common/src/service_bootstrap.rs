//! Unified service bootstrap utilities
//!
//! Startup banner, logging initialization and environment setup shared by
//! SmartCane services.

use crate::logging::{self, LogConfig};
use errors::CaneResult;
use std::path::Path;
use tracing::{info, Level};

/// Service metadata for startup
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    /// Service name (e.g., "alertsrv")
    pub name: String,
    /// Service version
    pub version: String,
    /// Service description
    pub description: String,
    /// Default port
    pub default_port: u16,
}

impl ServiceInfo {
    /// Create new service info
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
        default_port: u16,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
            default_port,
        }
    }
}

/// Print unified startup banner for any service
pub fn print_startup_banner(service: &ServiceInfo) {
    let banner = r#"
  ____                       _    ____
 / ___| _ __ ___   __ _ _ __| |_ / ___|__ _ _ __   ___
 \___ \| '_ ` _ \ / _` | '__| __| |   / _` | '_ \ / _ \
  ___) | | | | | | (_| | |  | |_| |__| (_| | | | |  __/
 |____/|_| |_| |_|\__,_|_|   \__|\____\__,_|_| |_|\___|
"#;

    info!("{}", banner);
    info!(" {} v{}", service.name.to_uppercase(), service.version);
    info!(" {}", service.description);
    info!(" Default Port: {}", service.default_port);
    info!("");
}

/// Initialize logging for a service with standard configuration
///
/// Log root directory priority:
/// 1. `CANE_LOG_DIR` environment variable
/// 2. `log_dir` from the service configuration
/// 3. `logs`
pub fn init_logging(
    service: &ServiceInfo,
    log_dir: Option<&str>,
    default_level: Option<&str>,
    ansi: bool,
) -> CaneResult<()> {
    logging::init_log_root(log_dir);

    let default_level = default_level
        .and_then(|s| s.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    let log_config = LogConfig {
        service_name: service.name.clone(),
        log_dir: logging::get_log_root().join(&service.name),
        default_level,
        ansi,
        enable_api_log: true,
    };

    logging::init_with_config(log_config)
}

/// Load environment variables in development mode
///
/// In debug builds, reads `.env` from the working directory. Release builds
/// expect the environment to be provided externally.
pub fn load_development_env() {
    #[cfg(debug_assertions)]
    {
        load_env_file(Path::new(".env"));
    }
}

/// Apply an env file; variables already set in the process are kept
///
/// Returns false when the file is missing or malformed.
pub fn load_env_file(path: &Path) -> bool {
    dotenv::from_path(path).is_ok()
}

/// Helper to get service port from configuration or environment
///
/// Environment overrides (`SERVICE_PORT`, then `{NAME}_PORT`) only apply when
/// the configured port is unset or still the service default.
pub fn get_service_port(config_port: u16, service: &ServiceInfo) -> u16 {
    let is_default = config_port == 0 || config_port == service.default_port;

    if is_default {
        if let Some(p) = std::env::var("SERVICE_PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
        {
            return p;
        }

        let env_var = format!("{}_PORT", service.name.to_uppercase());
        if let Some(p) = std::env::var(&env_var)
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
        {
            return p;
        }
    }

    if config_port > 0 {
        config_port
    } else {
        service.default_port
    }
}

//! Alert service configuration
//!
//! Layered with figment: built-in defaults, then the YAML file, then
//! `ALERTSRV_*` environment variables (`__` separates nested keys), then the
//! provider's own `TWILIO_*` variables.

use crate::error::{AlertSrvError, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/alertsrv.yaml";

/// Default API port
pub const DEFAULT_PORT: u16 = 6010;

/// Placeholder replaced with the reading in the SMS body
pub const HEARTBEAT_PLACEHOLDER: &str = "{heartbeat}";

/// Provider credential variables and the keys they fill
const TWILIO_ENV: [(&str, &str); 3] = [
    ("TWILIO_ACCOUNT_SID", "sms.account_sid"),
    ("TWILIO_AUTH_TOKEN", "sms.auth_token"),
    ("TWILIO_FROM_NUMBER", "sms.from_number"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "alertsrv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: common::DEFAULT_API_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/alertsrv.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log root; `CANE_LOG_DIR` wins when set
    #[serde(default)]
    pub dir: Option<String>,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            level: "info".to_string(),
        }
    }
}

/// SMS provider settings
#[derive(Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub api_base: String,
    pub country_code: String,
    pub message_template: String,
    pub timeout_secs: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
            api_base: "https://api.twilio.com".to_string(),
            country_code: "+82".to_string(),
            message_template: "Abnormal heart rate detected! Current heart rate: {heartbeat} bpm"
                .to_string(),
            timeout_secs: 10,
        }
    }
}

// Keep the token out of logs
impl std::fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"***")
            .field("from_number", &self.from_number)
            .field("api_base", &self.api_base)
            .field("country_code", &self.country_code)
            .field("message_template", &self.message_template)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SmsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Names of credential fields that are missing or blank
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        [
            ("sms.account_sid", &self.account_sid),
            ("sms.auth_token", &self.auth_token),
            ("sms.from_number", &self.from_number),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Alert policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Readings below this on `POST /heartbeat` trigger a fan-out
    pub http_threshold: i64,
    /// Readings below this on the WebSocket stream trigger a fan-out
    ///
    /// Strictly below, as on the HTTP path: a reading of exactly 50 with the
    /// default does not alert. Set 51 to also alert at 50.
    pub stream_threshold: i64,
    /// Concurrent gateway calls per fan-out
    pub fanout_concurrency: usize,
    /// Upper bound for a single gateway call
    pub dispatch_timeout_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            http_threshold: 60,
            stream_threshold: 50,
            fanout_concurrency: 4,
            dispatch_timeout_secs: 10,
        }
    }
}

impl AlertConfig {
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }
}

/// Complete alertsrv configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsrvConfig {
    pub service: ServiceConfig,
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub sms: SmsConfig,
    pub alert: AlertConfig,
}

impl AlertsrvConfig {
    /// Build the layered figment
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let yaml = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AlertSrvError::config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Yaml::file(path)
            },
            None => Yaml::file(DEFAULT_CONFIG_PATH),
        };

        let mut figment = Figment::from(Serialized::defaults(AlertsrvConfig::default()))
            .merge(yaml)
            .merge(Env::prefixed("ALERTSRV_").split("__"));

        // Merged as strings: figment would otherwise read "+1500..." as a number
        for (var, key) in TWILIO_ENV {
            if let Ok(value) = std::env::var(var) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }
        Ok(figment)
    }

    /// Load from file and environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(path)?)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        figment
            .extract()
            .map_err(|e| AlertSrvError::config(format!("Failed to load configuration: {}", e)))
    }

    /// Reject configurations the service cannot start with
    pub fn validate(&self) -> Result<()> {
        let missing = self.sms.missing_credentials();
        if !missing.is_empty() {
            return Err(AlertSrvError::config(format!(
                "Missing SMS provider credentials: {} (set TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN, TWILIO_FROM_NUMBER)",
                missing.join(", ")
            )));
        }
        if self.api.port == 0 {
            return Err(AlertSrvError::config("api.port must not be 0"));
        }
        if self.database.path.trim().is_empty() {
            return Err(AlertSrvError::config("database.path must not be empty"));
        }
        if self.alert.fanout_concurrency == 0 {
            return Err(AlertSrvError::config(
                "alert.fanout_concurrency must be at least 1",
            ));
        }
        if self.alert.dispatch_timeout_secs == 0 {
            return Err(AlertSrvError::config(
                "alert.dispatch_timeout_secs must be at least 1",
            ));
        }
        if !self.sms.message_template.contains(HEARTBEAT_PLACEHOLDER) {
            return Err(AlertSrvError::config(format!(
                "sms.message_template must contain {}",
                HEARTBEAT_PLACEHOLDER
            )));
        }
        Ok(())
    }

    /// Bind address as `host:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

//! Notification Gateway
//!
//! Delivers alert SMS to contacts. Implementations never fail past the
//! gateway boundary: every provider-side problem becomes an error
//! [`DispatchOutcome`] and the pipeline decides how to aggregate.

pub mod twilio;

pub use twilio::TwilioGateway;

use crate::config::HEARTBEAT_PLACEHOLDER;
use crate::error::AlertSrvError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of one send attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DispatchOutcome {
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
    },
    Error {
        detail: String,
    },
}

impl DispatchOutcome {
    pub fn success(message_id: impl Into<String>) -> Self {
        DispatchOutcome::Success {
            message_id: Some(message_id.into()),
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        DispatchOutcome::Error {
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Success { .. })
    }
}

/// A failed send is recorded, never propagated
impl From<AlertSrvError> for DispatchOutcome {
    fn from(err: AlertSrvError) -> Self {
        DispatchOutcome::error(err.to_string())
    }
}

/// SMS delivery seam
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Send the alert for `heartbeat` to a stored domestic `phone`
    async fn send_alert(&self, phone: &str, heartbeat: i64) -> DispatchOutcome;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Convert a stored phone into international format
///
/// Numbers already carrying `+` are passed through. Otherwise one leading
/// trunk `0` is dropped and `country_code` is prepended.
pub fn normalize_phone(phone: &str, country_code: &str) -> String {
    let phone = phone.trim();
    if phone.starts_with('+') {
        return phone.to_string();
    }
    let national = phone.strip_prefix('0').unwrap_or(phone);
    format!("{}{}", country_code, national)
}

/// Render the alert body
pub fn compose_message(template: &str, heartbeat: i64) -> String {
    template.replace(HEARTBEAT_PLACEHOLDER, &heartbeat.to_string())
}

//! Twilio SMS gateway

use super::{compose_message, normalize_phone, DispatchOutcome, NotificationGateway};
use crate::config::SmsConfig;
use crate::error::{AlertSrvError, Result};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::{debug, warn};

/// Subset of the Messages API response we care about
#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: Option<String>,
    code: Option<i64>,
}

/// Sends alerts through the Twilio Messages API
pub struct TwilioGateway {
    http_client: HttpClient,
    messages_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
    country_code: String,
    message_template: String,
}

impl std::fmt::Debug for TwilioGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioGateway")
            .field("messages_url", &self.messages_url)
            .field("from_number", &self.from_number)
            .finish_non_exhaustive()
    }
}

impl TwilioGateway {
    /// Build a gateway from provider settings
    ///
    /// Fails with a configuration error when any credential is blank.
    pub fn new(config: &SmsConfig) -> Result<Self> {
        let missing = config.missing_credentials();
        if !missing.is_empty() {
            return Err(AlertSrvError::config(format!(
                "Missing SMS provider credentials: {}",
                missing.join(", ")
            )));
        }

        let http_client = HttpClient::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AlertSrvError::config(format!("Failed to create HTTP client: {}", e)))?;

        let messages_url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            config.api_base.trim_end_matches('/'),
            config.account_sid
        );

        Ok(Self {
            http_client,
            messages_url,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            country_code: config.country_code.clone(),
            message_template: config.message_template.clone(),
        })
    }

    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }
}

#[async_trait]
impl NotificationGateway for TwilioGateway {
    async fn send_alert(&self, phone: &str, heartbeat: i64) -> DispatchOutcome {
        let to = normalize_phone(phone, &self.country_code);
        let body = compose_message(&self.message_template, heartbeat);

        let response = match self
            .http_client
            .post(&self.messages_url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", to.as_str()),
                ("From", self.from_number.as_str()),
                ("Body", body.as_str()),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("SMS request to {} failed: {}", to, e);
                return AlertSrvError::ProviderDispatch(format!("Request failed: {}", e)).into();
            },
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<MessageResponse>().await {
                Ok(MessageResponse { sid: Some(sid) }) => {
                    debug!("SMS queued for {}: {}", to, sid);
                    DispatchOutcome::success(sid)
                },
                Ok(MessageResponse { sid: None }) => DispatchOutcome::Success { message_id: None },
                Err(e) => {
                    // Accepted by the provider; only the body was unreadable
                    warn!("Unreadable SMS provider response for {}: {}", to, e);
                    DispatchOutcome::Success { message_id: None }
                },
            };
        }

        let detail = match response.json::<ProviderError>().await {
            Ok(ProviderError {
                message: Some(message),
                code,
            }) => match code {
                Some(code) => format!("{} (code {})", message, code),
                None => message,
            },
            _ => format!("Provider returned {}", status),
        };
        warn!("SMS to {} rejected: {}", to, detail);
        AlertSrvError::ProviderDispatch(detail).into()
    }

    fn name(&self) -> &str {
        "twilio"
    }
}

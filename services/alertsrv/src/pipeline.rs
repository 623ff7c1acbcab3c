//! Alert Pipeline
//!
//! Decides whether a heartbeat reading warrants an alert and fans the SMS out
//! to every registered contact. Holds no mutable state, so one instance is
//! shared by the HTTP and WebSocket front doors.

use crate::config::AlertConfig;
use crate::contacts::{Contact, ContactStore};
use crate::error::{AlertSrvError, Result};
use crate::notify::{DispatchOutcome, NotificationGateway};
use futures::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where a reading came from; each path has its own threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingSource {
    Http,
    Stream,
}

/// Overall outcome of one reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertStatus {
    /// Fan-out completed (individual sends may still have failed)
    Success,
    /// Reading was low but nobody is registered
    NoRecipients,
    /// Reading at or above threshold
    NoAction,
}

/// Per-contact send result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDispatch {
    pub contact_id: i64,
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
}

/// Result of handling one reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDispatchResult {
    pub status: AlertStatus,
    pub message: String,
    pub heartbeat: i64,
    pub threshold: i64,
    /// One entry per contact, in contact id order
    pub results: Vec<ContactDispatch>,
}

impl AlertDispatchResult {
    fn without_dispatch(status: AlertStatus, message: &str, heartbeat: i64, threshold: i64) -> Self {
        Self {
            status,
            message: message.to_string(),
            heartbeat,
            threshold,
            results: Vec::new(),
        }
    }

    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !r.outcome.is_success())
            .count()
    }
}

pub struct AlertPipeline {
    contacts: ContactStore,
    gateway: Arc<dyn NotificationGateway>,
    policy: AlertConfig,
}

impl AlertPipeline {
    pub fn new(
        contacts: ContactStore,
        gateway: Arc<dyn NotificationGateway>,
        policy: AlertConfig,
    ) -> Self {
        Self {
            contacts,
            gateway,
            policy,
        }
    }

    pub fn threshold(&self, source: ReadingSource) -> i64 {
        match source {
            ReadingSource::Http => self.policy.http_threshold,
            ReadingSource::Stream => self.policy.stream_threshold,
        }
    }

    /// Handle one heartbeat reading
    ///
    /// Only a contact store failure is returned as `Err`; provider failures
    /// are recorded per contact.
    pub async fn handle_reading(
        &self,
        heartbeat: i64,
        source: ReadingSource,
    ) -> Result<AlertDispatchResult> {
        if heartbeat < 0 {
            return Err(AlertSrvError::validation(
                "Heartbeat must be a non-negative integer",
            ));
        }

        let threshold = self.threshold(source);
        debug!("Heartbeat {} received via {:?}", heartbeat, source);

        if heartbeat >= threshold {
            return Ok(AlertDispatchResult::without_dispatch(
                AlertStatus::NoAction,
                "Heartbeat within normal range",
                heartbeat,
                threshold,
            ));
        }

        let contacts = self.contacts.list().await?;
        if contacts.is_empty() {
            warn!(
                "Heartbeat {} below {} but no emergency contacts are registered",
                heartbeat, threshold
            );
            return Ok(AlertDispatchResult::without_dispatch(
                AlertStatus::NoRecipients,
                "No emergency contacts registered",
                heartbeat,
                threshold,
            ));
        }

        warn!(
            "Heartbeat {} below {}, alerting {} contacts via {}",
            heartbeat,
            threshold,
            contacts.len(),
            self.gateway.name()
        );

        let results = self.fan_out(contacts, heartbeat).await;
        let mut result = AlertDispatchResult {
            status: AlertStatus::Success,
            message: String::new(),
            heartbeat,
            threshold,
            results,
        };
        let failed = result.failed_count();
        result.message = format!(
            "Alert dispatched to {} contacts ({} failed)",
            result.results.len(),
            failed
        );
        info!("{}", result.message);
        Ok(result)
    }

    /// Send to every contact with bounded concurrency, keeping contact order
    async fn fan_out(&self, contacts: Vec<Contact>, heartbeat: i64) -> Vec<ContactDispatch> {
        let gateway = &self.gateway;
        let timeout = self.policy.dispatch_timeout();

        stream::iter(contacts)
            .map(|contact| async move {
                let outcome = send_with_timeout(gateway.as_ref(), &contact, heartbeat, timeout).await;
                if let DispatchOutcome::Error { detail } = &outcome {
                    warn!("Alert to contact {} failed: {}", contact.id, detail);
                }
                ContactDispatch {
                    contact_id: contact.id,
                    outcome,
                }
            })
            .buffered(self.policy.fanout_concurrency.max(1))
            .collect()
            .await
    }
}

async fn send_with_timeout(
    gateway: &dyn NotificationGateway,
    contact: &Contact,
    heartbeat: i64,
    timeout: Duration,
) -> DispatchOutcome {
    match tokio::time::timeout(timeout, gateway.send_alert(&contact.phone, heartbeat)).await {
        Ok(outcome) => outcome,
        Err(_) => AlertSrvError::ProviderDispatch(format!(
            "no response within {}s",
            timeout.as_secs()
        ))
        .into(),
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Mutex;

    /// Records every call; fails for phones listed in `failing`
    #[derive(Default)]
    struct StubGateway {
        calls: Mutex<Vec<(String, i64)>>,
        failing: Vec<String>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl NotificationGateway for StubGateway {
        async fn send_alert(&self, phone: &str, heartbeat: i64) -> DispatchOutcome {
            self.calls
                .lock()
                .unwrap()
                .push((phone.to_string(), heartbeat));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing.iter().any(|p| p == phone) {
                DispatchOutcome::error("invalid number")
            } else {
                DispatchOutcome::success(format!("SM-{}", phone))
            }
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    async fn contact_store() -> ContactStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = ContactStore::new(pool);
        store.init_schema().await.unwrap();
        store
    }

    fn pipeline(store: ContactStore, gateway: Arc<StubGateway>) -> AlertPipeline {
        AlertPipeline::new(store, gateway, AlertConfig::default())
    }

    #[tokio::test]
    async fn test_at_or_above_threshold_no_dispatch() {
        let store = contact_store().await;
        store.register("A", "01011112222").await.unwrap();
        let gateway = Arc::new(StubGateway::default());
        let pipeline = pipeline(store, gateway.clone());

        for value in [60, 65, 200] {
            let result = pipeline.handle_reading(value, ReadingSource::Http).await.unwrap();
            assert_eq!(result.status, AlertStatus::NoAction);
            assert!(result.results.is_empty());
        }
        let result = pipeline.handle_reading(50, ReadingSource::Stream).await.unwrap();
        assert_eq!(result.status, AlertStatus::NoAction);

        assert!(gateway.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_recipients() {
        let gateway = Arc::new(StubGateway::default());
        let pipeline = pipeline(contact_store().await, gateway.clone());

        let result = pipeline.handle_reading(30, ReadingSource::Http).await.unwrap();
        assert_eq!(result.status, AlertStatus::NoRecipients);
        assert!(gateway.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fan_out_tolerates_failures() {
        let store = contact_store().await;
        store.register("A", "01011112222").await.unwrap();
        store.register("B", "01033334444").await.unwrap();
        store.register("C", "01055556666").await.unwrap();
        let gateway = Arc::new(StubGateway {
            failing: vec!["01033334444".to_string()],
            ..Default::default()
        });
        let pipeline = pipeline(store, gateway.clone());

        let result = pipeline.handle_reading(55, ReadingSource::Http).await.unwrap();
        assert_eq!(result.status, AlertStatus::Success);
        assert_eq!(result.threshold, 60);
        assert_eq!(gateway.calls.lock().unwrap().len(), 3);

        let ids: Vec<i64> = result.results.iter().map(|r| r.contact_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(result.results[0].outcome.is_success());
        assert_eq!(
            result.results[1].outcome,
            DispatchOutcome::error("invalid number")
        );
        assert_eq!(result.failed_count(), 1);
    }

    #[tokio::test]
    async fn test_stream_threshold_is_lower() {
        let store = contact_store().await;
        store.register("A", "01011112222").await.unwrap();
        let gateway = Arc::new(StubGateway::default());
        let pipeline = pipeline(store, gateway.clone());

        let result = pipeline.handle_reading(55, ReadingSource::Stream).await.unwrap();
        assert_eq!(result.status, AlertStatus::NoAction);
        let result = pipeline.handle_reading(49, ReadingSource::Stream).await.unwrap();
        assert_eq!(result.status, AlertStatus::Success);
        assert_eq!(*gateway.calls.lock().unwrap(), vec![("01011112222".to_string(), 49)]);
    }

    #[tokio::test]
    async fn test_negative_reading_rejected() {
        let gateway = Arc::new(StubGateway::default());
        let pipeline = pipeline(contact_store().await, gateway);
        assert!(matches!(
            pipeline.handle_reading(-1, ReadingSource::Http).await,
            Err(AlertSrvError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let store = contact_store().await;
        store.register("A", "01011112222").await.unwrap();
        let gateway = Arc::new(StubGateway {
            delay: Some(Duration::from_secs(30)),
            ..Default::default()
        });
        let policy = AlertConfig {
            dispatch_timeout_secs: 1,
            ..AlertConfig::default()
        };
        let pipeline = AlertPipeline::new(store, gateway, policy);

        let result = pipeline.handle_reading(40, ReadingSource::Http).await.unwrap();
        assert_eq!(result.status, AlertStatus::Success);
        assert_eq!(
            result.results[0].outcome,
            DispatchOutcome::error("Provider dispatch failed: no response within 1s")
        );
    }

    #[test]
    fn test_result_serialization() {
        let result = AlertDispatchResult {
            status: AlertStatus::NoRecipients,
            message: "none".to_string(),
            heartbeat: 40,
            threshold: 60,
            results: vec![ContactDispatch {
                contact_id: 1,
                outcome: DispatchOutcome::success("SM1"),
            }],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "no-recipients");
        assert_eq!(value["results"][0]["contact_id"], 1);
        assert_eq!(value["results"][0]["status"], "success");
        assert_eq!(value["results"][0]["message_id"], "SM1");
    }
}

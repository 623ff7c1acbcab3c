//! Application State Management
//!
//! Central application state shared by all API handlers

use std::sync::Arc;

use common::sqlite::SqliteClient;

use crate::config::AlertsrvConfig;
use crate::contacts::ContactStore;
use crate::pipeline::AlertPipeline;
use crate::sensor::SensorStore;

/// Application state containing shared resources
pub struct AppState {
    /// Effective configuration
    pub config: Arc<AlertsrvConfig>,

    /// SQLite client (health checks)
    pub sqlite_client: SqliteClient,

    /// Emergency contact repository
    pub contacts: ContactStore,

    /// Sensor reading repository
    pub sensors: SensorStore,

    /// Heartbeat alert pipeline shared by both front doors
    pub pipeline: Arc<AlertPipeline>,
}

impl AppState {
    pub fn new(
        config: Arc<AlertsrvConfig>,
        sqlite_client: SqliteClient,
        contacts: ContactStore,
        sensors: SensorStore,
        pipeline: Arc<AlertPipeline>,
    ) -> Self {
        Self {
            config,
            sqlite_client,
            contacts,
            sensors,
            pipeline,
        }
    }
}

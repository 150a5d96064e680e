//! Application state shared across handlers

use crate::dashboard::DashboardContext;
use chrono::{DateTime, Utc};

use super::ServerConfig;

/// Application state shared across handlers; immutable after startup
pub struct AppState {
    pub config: ServerConfig,
    pub context: DashboardContext,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, context: DashboardContext) -> Self {
        Self {
            config,
            context,
            started_at: Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }
}

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::AppConfig;

/// State shared by all HTTP handlers. Read-only after start-up.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    config: AppConfig,
    started_at: DateTime<Utc>,
}

impl SharedState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(SharedStateInner {
                config,
                started_at: Utc::now(),
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn server_port(&self) -> u16 {
        self.inner.config.server_port
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }
}

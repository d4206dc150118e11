use std::sync::Arc;

use anyhow::Result;

use backend_application::{AppState, Metrics};
use backend_infrastructure::AppConfig;

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;

        let state = AppState {
            config: config.to_runtime_config(),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}

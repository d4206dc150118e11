use std::sync::Arc;

use backend_domain::RuntimeConfig;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub metrics: Arc<Metrics>,
}

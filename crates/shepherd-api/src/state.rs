//! Application state.

use std::sync::Arc;

use shepherd_config::RuntimeConfig;

use crate::activation::Backends;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RuntimeConfig>,
    pub backends: Backends,
}

impl AppState {
    pub fn new(config: RuntimeConfig, backends: Backends) -> Self {
        Self {
            config: Arc::new(config),
            backends,
        }
    }
}

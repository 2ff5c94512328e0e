//! Application state shared across all handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::database::EventStore;
use crate::events::EventProcessor;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Event storage, also used directly by search and health
    pub store: Arc<dyn EventStore>,
    /// Webhook ingestion pipeline
    pub processor: Arc<EventProcessor>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn EventStore>) -> Self {
        let processor = Arc::new(EventProcessor::with_tolerance(
            store.clone(),
            config.signature_tolerance,
        ));

        Self {
            config,
            store,
            processor,
        }
    }
}

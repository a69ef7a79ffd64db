mod form;
mod listing;

pub use form::FormSession;
pub use listing::{delete_entry, first_page, list_page};

use crate::api::{create_clients, ContentApi, UploadGateway};
use crate::cache::{spawn_invalidation, ListCache};
use crate::config::Config;
use crate::error::Result;
use crate::submission::{FormEvent, SubmissionOrchestrator};
use std::sync::Arc;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Shared collaborators of every dashboard command.
pub struct AppContext {
    pub api: Arc<dyn ContentApi>,
    pub gateway: Arc<dyn UploadGateway>,
    pub events: broadcast::Sender<FormEvent>,
    pub cache: Arc<ListCache>,
    pub config: Config,
}

impl AppContext {
    /// Builds the HTTP clients from `config`. Must run inside a Tokio runtime.
    pub fn new(config: Config) -> Result<Self> {
        let (api, gateway) = create_clients(&config)?;
        Ok(Self::with_clients(config, api, gateway))
    }

    /// Wires the given clients together and starts the list cache listener.
    pub fn with_clients(
        config: Config,
        api: Arc<dyn ContentApi>,
        gateway: Arc<dyn UploadGateway>,
    ) -> Self {
        let (events, listener) = broadcast::channel(EVENT_CAPACITY);
        let cache = Arc::new(ListCache::new(config.cache_ttl_secs));
        spawn_invalidation(cache.clone(), listener);

        AppContext {
            api,
            gateway,
            events,
            cache,
            config,
        }
    }

    pub fn orchestrator(&self) -> SubmissionOrchestrator {
        SubmissionOrchestrator::new(
            self.api.clone(),
            self.gateway.clone(),
            self.events.clone(),
            self.config.update_policy,
        )
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }
}

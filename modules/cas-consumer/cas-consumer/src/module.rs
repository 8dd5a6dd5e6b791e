//! CAS consumer module.

use std::sync::Arc;

use cas_consumer_sdk::{CasConsumerClient, CasConsumerError, CasEventSubscriber, UserStore};
use tracing::info;

use crate::config::CasConsumerConfig;
use crate::domain::{CasConsumerLocalClient, DomainError, RedirectUrls, Service};

/// CAS consumer module.
///
/// This module:
/// 1. Validates its configuration (protocol, provider URLs, timeout)
/// 2. Wires fetcher, validator, resolver and notifier into one service
/// 3. Exposes the service through [`CasConsumerClient`]
pub struct CasConsumer {
    service: Arc<Service>,
    client: Arc<dyn CasConsumerClient>,
    redirects: RedirectUrls,
}

impl CasConsumer {
    /// # Errors
    ///
    /// `Configuration` if the configuration is unusable.
    #[tracing::instrument(skip_all, fields(server_url = %cfg.server_url, protocol = cfg.protocol))]
    pub fn init(
        cfg: &CasConsumerConfig,
        store: Arc<dyn UserStore>,
        subscribers: Vec<Arc<dyn CasEventSubscriber>>,
    ) -> Result<Self, CasConsumerError> {
        let subscriber_count = subscribers.len();
        let service = Arc::new(Service::new(cfg, store, subscribers).map_err(configuration)?);
        let redirects = RedirectUrls::from_config(cfg).map_err(configuration)?;
        let client: Arc<dyn CasConsumerClient> =
            Arc::new(CasConsumerLocalClient::new(service.clone()));

        info!(
            protocol = %service.protocol(),
            timeout = ?cfg.request_timeout,
            subscribers = subscriber_count,
            "Initialized cas_consumer"
        );

        Ok(Self {
            service,
            client,
            redirects,
        })
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn CasConsumerClient> {
        self.client.clone()
    }

    #[must_use]
    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    #[must_use]
    pub fn redirects(&self) -> &RedirectUrls {
        &self.redirects
    }
}

fn configuration(e: DomainError) -> CasConsumerError {
    match e {
        DomainError::Configuration(msg) => CasConsumerError::Configuration(msg),
        other => CasConsumerError::Configuration(other.to_string()),
    }
}

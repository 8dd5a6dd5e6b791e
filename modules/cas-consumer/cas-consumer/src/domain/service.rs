//! Ticket authentication pipeline: fetch, parse, resolve, notify.

use std::sync::Arc;

use cas_consumer_sdk::{
    CasEventSubscriber, LocalUser, ProtocolVersion, UserStore, ValidationContext,
};
use tracing::{debug, info};

use super::error::DomainError;
use super::fetcher::TicketFetcher;
use super::notifier::Notifier;
use super::resolver::{IdentityResolver, ResolverPolicy};
use super::validator::{TicketValidator, validator_for};
use crate::config::CasConsumerConfig;

/// CAS consumer service.
///
/// Holds the components of one configured consumer. Safe to share between
/// concurrent login requests; nothing here is mutated after construction.
pub struct Service {
    protocol: ProtocolVersion,
    fetcher: TicketFetcher,
    validator: Arc<dyn TicketValidator>,
    resolver: IdentityResolver,
    notifier: Notifier,
    store: Arc<dyn UserStore>,
}

impl Service {
    /// # Errors
    ///
    /// `Configuration` if the protocol is unsupported or the provider URL is
    /// invalid.
    pub fn new(
        cfg: &CasConsumerConfig,
        store: Arc<dyn UserStore>,
        subscribers: Vec<Arc<dyn CasEventSubscriber>>,
    ) -> Result<Self, DomainError> {
        let protocol = cfg.protocol_version()?;
        let fetcher = TicketFetcher::from_config(cfg)?;

        Ok(Self {
            protocol,
            fetcher,
            validator: validator_for(protocol),
            resolver: IdentityResolver::new(store.clone(), ResolverPolicy::from_config(cfg)),
            notifier: Notifier::new(subscribers).with_delivery_timeout(cfg.request_timeout),
            store,
        })
    }

    #[must_use]
    pub fn protocol(&self) -> ProtocolVersion {
        self.protocol
    }

    /// Context attached to errors escaping [`Self::authenticate`].
    #[must_use]
    pub fn context(&self, ticket: &str, service: &str) -> ValidationContext {
        ValidationContext {
            ticket: ticket.to_owned(),
            service: service.to_owned(),
            protocol: self.protocol,
        }
    }

    /// Validate `ticket` and return the resolved local user.
    ///
    /// Merge candidates are announced before the authentication event.
    ///
    /// # Errors
    ///
    /// - `Network` if the provider could not be queried
    /// - `Protocol` if the answer is not a CAS document
    /// - `Resolution` if the user store failed
    #[tracing::instrument(skip_all, fields(protocol = %self.protocol, service = %service))]
    pub async fn authenticate(
        &self,
        ticket: &str,
        service: &str,
    ) -> Result<Option<LocalUser>, DomainError> {
        let body = self.fetcher.fetch(ticket, service).await?;
        let validation = self.validator.parse(&body)?;

        if !validation.is_success() {
            info!("CAS provider did not validate the ticket");
            return Ok(None);
        }

        let Some(resolution) = self.resolver.resolve(&validation).await? else {
            return Ok(None);
        };
        debug!(
            user_id = resolution.user.id,
            created = resolution.created,
            "Resolved CAS identity"
        );

        if let Some(candidates) = &resolution.merge_candidates {
            self.notifier.announce_merge_candidates(candidates).await;
        }
        self.notifier
            .announce_authenticated(&resolution.user, validation.attributes())
            .await;

        Ok(Some(resolution.user))
    }

    /// # Errors
    ///
    /// `Resolution` if the user store failed.
    pub async fn get_user(&self, id: i64) -> Result<Option<LocalUser>, DomainError> {
        Ok(self.store.get(id).await?)
    }
}

//! Domain layer for the CAS consumer.

pub mod error;
pub mod fetcher;
pub mod local_client;
pub mod notifier;
pub mod query;
pub mod redirect;
pub mod resolver;
pub mod service;
pub mod validator;

pub use error::DomainError;
pub use fetcher::TicketFetcher;
pub use local_client::CasConsumerLocalClient;
pub use notifier::{BroadcastSubscriber, Notifier};
pub use redirect::{RedirectUrls, safe_redirect_target};
pub use resolver::{IdentityResolver, Resolution, ResolverPolicy};
pub use service::Service;
pub use validator::{Cas1Validator, Cas2Validator, TicketValidator, validator_for};

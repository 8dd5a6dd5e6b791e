//! Subscriber trait for CAS consumer events.
//!
//! Subscribers are registered with the consumer's notifier at construction
//! time. A failing subscriber is logged and skipped; it never aborts an
//! authentication and never prevents other subscribers from being called.

use async_trait::async_trait;

use crate::error::SubscriberError;
use crate::models::CasEvent;

#[async_trait]
pub trait CasEventSubscriber: Send + Sync {
    /// Subscriber name used in logs.
    fn name(&self) -> &str;

    /// Handle one event.
    ///
    /// # Errors
    ///
    /// Any failure; the notifier logs it and moves on.
    async fn handle(&self, event: &CasEvent) -> Result<(), SubscriberError>;
}

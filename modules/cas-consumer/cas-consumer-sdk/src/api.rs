//! Public API trait for the CAS consumer.
//!
//! This trait defines the interface that login handlers use to turn a
//! service ticket into a local user.

use async_trait::async_trait;

use crate::error::CasConsumerError;
use crate::models::LocalUser;

/// Public API trait for the CAS consumer.
///
/// ```ignore
/// let cas: Arc<dyn CasConsumerClient> = module.client();
///
/// match cas.authenticate(&ticket, "https://app.example.com/login/").await? {
///     Some(user) => log_in(user),
///     None => forbidden("Error authenticating with CAS"),
/// }
/// ```
#[async_trait]
pub trait CasConsumerClient: Send + Sync {
    /// Validate `ticket` for `service` and resolve the asserted identity to a
    /// local user, creating one when nothing matches.
    ///
    /// Returns `Ok(None)` when the provider rejected the ticket.
    ///
    /// # Errors
    ///
    /// - `Network` if the provider could not be queried
    /// - `Protocol` if the provider response is not a CAS document
    /// - `Resolution` if the user store failed
    async fn authenticate(
        &self,
        ticket: &str,
        service: &str,
    ) -> Result<Option<LocalUser>, CasConsumerError>;

    /// Look up a previously resolved user by store id.
    ///
    /// # Errors
    ///
    /// - `Store` if the user store failed
    async fn get_user(&self, id: i64) -> Result<Option<LocalUser>, CasConsumerError>;
}

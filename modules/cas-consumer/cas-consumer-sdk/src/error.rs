//! Error types for the CAS consumer module.

use thiserror::Error;

use crate::models::ValidationContext;

/// Errors that can occur when using the CAS consumer API.
///
/// A rejected ticket is not an error: [`crate::CasConsumerClient::authenticate`]
/// returns `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum CasConsumerError {
    /// The provider could not be reached, timed out, answered with a
    /// non-success status, or sent an undecodable body.
    #[error("network error ({context}): {message}")]
    Network {
        context: ValidationContext,
        message: String,
    },

    /// The provider answered with a document that is not a CAS response.
    #[error("protocol error ({context}): {message}")]
    Protocol {
        context: ValidationContext,
        message: String,
    },

    /// The user store failed while resolving the validated identity.
    #[error("user resolution failed ({context}): {source}")]
    Resolution {
        context: ValidationContext,
        #[source]
        source: UserStoreError,
    },

    /// The consumer is misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The user store failed outside of a ticket validation.
    #[error("user store error: {0}")]
    Store(#[from] UserStoreError),
}

/// Errors reported by [`crate::UserStore`] implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserStoreError {
    #[error("user {0} not found")]
    NotFound(i64),

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("internal store error: {0}")]
    Internal(String),
}

/// Error reported by a [`crate::CasEventSubscriber`]. Never reaches callers
/// of the consumer API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("subscriber failed: {0}")]
pub struct SubscriberError(pub String);

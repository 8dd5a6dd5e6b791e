//! Domain errors for the CAS consumer.

use cas_consumer_sdk::{CasConsumerError, UserStoreError, ValidationContext};

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("network error: {0}")]
    Network(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("user store error: {0}")]
    Resolution(#[from] UserStoreError),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DomainError {
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Attach the failed validation attempt for callers of the public API.
    #[must_use]
    pub fn into_client_error(self, context: ValidationContext) -> CasConsumerError {
        match self {
            Self::Network(message) => CasConsumerError::Network { context, message },
            Self::Protocol(message) => CasConsumerError::Protocol { context, message },
            Self::Resolution(source) => CasConsumerError::Resolution { context, source },
            Self::Configuration(msg) => CasConsumerError::Configuration(msg),
        }
    }
}

//! Protocol validators: turn one provider response into a [`ValidationResult`].

use std::sync::Arc;

use cas_consumer_sdk::{ProtocolVersion, ValidationResult};

use super::error::DomainError;

mod cas1;
mod cas2;

pub use cas1::Cas1Validator;
pub use cas2::{CAS_NAMESPACE, Cas2Validator};

/// Parses a validation response body for one protocol version.
pub trait TicketValidator: Send + Sync {
    fn protocol(&self) -> ProtocolVersion;

    /// Parse the full (already decompressed) response body.
    ///
    /// A provider rejection is `Ok` with an unsuccessful result.
    ///
    /// # Errors
    ///
    /// `Protocol` if the body is not a document of this protocol at all.
    fn parse(&self, body: &[u8]) -> Result<ValidationResult, DomainError>;
}

#[must_use]
pub fn validator_for(protocol: ProtocolVersion) -> Arc<dyn TicketValidator> {
    match protocol {
        ProtocolVersion::Cas1 => Arc::new(Cas1Validator),
        ProtocolVersion::Cas2 => Arc::new(Cas2Validator),
    }
}

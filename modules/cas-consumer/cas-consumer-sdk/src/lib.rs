//! CAS Consumer SDK
//!
//! This crate provides the public API for the `cas_consumer` module:
//!
//! - [`CasConsumerClient`] - Public API trait for login handlers
//! - [`UserStore`] - User store trait the consumer resolves identities against
//! - [`CasEventSubscriber`] - Subscriber trait for authentication events
//! - [`ValidationResult`], [`LocalUser`], [`MergeCandidateSet`], [`CasEvent`] - Models
//! - [`CasConsumerError`], [`UserStoreError`], [`SubscriberError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use cas_consumer_sdk::CasConsumerClient;
//!
//! let user = cas.authenticate(&ticket, &service).await?;
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod error;
pub mod models;
pub mod store_api;
pub mod subscriber_api;

// Re-export main types at crate root
pub use api::CasConsumerClient;
pub use error::{CasConsumerError, SubscriberError, UserStoreError};
pub use models::{
    CasEvent, Credential, LocalUser, MergeCandidateSet, NewLocalUser, ProtocolVersion,
    ValidationContext, ValidationResult,
};
pub use store_api::UserStore;
pub use subscriber_api::CasEventSubscriber;

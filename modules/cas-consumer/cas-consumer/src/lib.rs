//! CAS Consumer Module
//!
//! Validates CAS service tickets against the configured provider (CAS 1.0
//! plain text or CAS 2.0 XML), resolves the asserted identities to a local
//! user through a [`UserStore`](cas_consumer_sdk::UserStore), and announces
//! the outcome to registered subscribers.
//!
//! Provides the `CasConsumerClient` trait implementation for login handlers.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

#[cfg(test)]
mod test_support;

pub use config::CasConsumerConfig;
pub use module::CasConsumer;

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static User Store Plugin
//!
//! In-memory [`cas_consumer_sdk::UserStore`] for development and testing.
//! Users listed in the configuration are created at startup with ids in
//! listing order; users created by the CAS consumer get the next free id.
//! Nothing survives a restart.
//!
//! ## Configuration
//!
//! ```yaml
//! static_user_store:
//!   users:
//!     - username: "foo"
//!       email: "foo@example.com"
//!     - username: "bar"
//!       is_active: false
//! ```

pub mod config;
pub mod domain;

pub use config::StaticUserStorePluginConfig;
pub use domain::StaticUserStore;

//! Domain layer for the static user store plugin.

pub mod client;
pub mod service;

pub use service::StaticUserStore;

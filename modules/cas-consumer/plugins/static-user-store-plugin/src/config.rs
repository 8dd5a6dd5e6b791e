//! Configuration for the static user store plugin.

use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticUserStorePluginConfig {
    /// Users present when the store starts.
    pub users: Vec<SeedUser>,
}

/// One pre-provisioned user.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedUser {
    pub username: String,

    #[serde(default)]
    pub email: Option<String>,

    /// Inactive users never match a CAS identity.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

//! Configuration for the CAS consumer.

use std::collections::BTreeMap;
use std::time::Duration;

use cas_consumer_sdk::ProtocolVersion;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::domain::DomainError;

fn default_protocol() -> u8 {
    1
}

fn default_login_path() -> String {
    "/cas/login/".to_owned()
}

fn default_logout_path() -> String {
    "/cas/logout/".to_owned()
}

fn default_cas1_validate_path() -> String {
    "/cas/validate/".to_owned()
}

fn default_cas2_validate_path() -> String {
    "/cas/serviceValidate/".to_owned()
}

fn default_ticket_param() -> String {
    "ticket".to_owned()
}

fn default_service_param() -> String {
    "service".to_owned()
}

fn default_urlencode_params() -> bool {
    true
}

/// CAS consumer configuration.
///
/// ```yaml
/// cas_consumer:
///   server_url: "https://cas.example.com"
///   protocol: 2
///   request_timeout: "5s"
///   service: "https://app.example.com/login/"
///   extra_validation_params:
///     renew: "true"
///   sync_email: true
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct CasConsumerConfig {
    /// Provider base URL; the login, logout and validation paths are appended to it.
    pub server_url: String,

    /// Ticket validation protocol: `1` (CAS 1.0) or `2` (CAS 2.0).
    #[serde(default = "default_protocol")]
    pub protocol: u8,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_logout_path")]
    pub logout_path: String,

    /// Validation endpoint used with protocol 1.
    #[serde(default = "default_cas1_validate_path")]
    pub cas1_validate_path: String,

    /// Validation endpoint used with protocol 2.
    #[serde(default = "default_cas2_validate_path")]
    pub cas2_validate_path: String,

    /// Query parameter carrying the ticket.
    #[serde(default = "default_ticket_param")]
    pub ticket_param: String,

    /// Query parameter carrying the service URL.
    #[serde(default = "default_service_param")]
    pub service_param: String,

    /// Default service URL used by login handlers.
    #[serde(default)]
    pub service: Option<String>,

    /// Static parameters added to every validation request.
    #[serde(default)]
    pub extra_validation_params: BTreeMap<String, String>,

    /// Static parameters added to the login redirect.
    #[serde(default)]
    pub extra_login_params: BTreeMap<String, String>,

    /// Form-urlencode query parameters. When false they are joined raw.
    #[serde(default = "default_urlencode_params")]
    pub urlencode_params: bool,

    /// Copy the `email` attribute onto the local user.
    #[serde(default)]
    pub sync_email: bool,

    /// Rename the matched local user to the primary identifier.
    #[serde(default)]
    pub sync_username: bool,

    /// Send logouts through the provider's logout page.
    #[serde(default)]
    pub complete_logout: bool,

    /// Upper bound for one validation request, e.g. `"5s"`. Required.
    #[serde(deserialize_with = "deserialize_duration")]
    pub request_timeout: Duration,
}

impl CasConsumerConfig {
    /// Configuration with every optional field at its default.
    #[must_use]
    pub fn new(server_url: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            server_url: server_url.into(),
            protocol: default_protocol(),
            login_path: default_login_path(),
            logout_path: default_logout_path(),
            cas1_validate_path: default_cas1_validate_path(),
            cas2_validate_path: default_cas2_validate_path(),
            ticket_param: default_ticket_param(),
            service_param: default_service_param(),
            service: None,
            extra_validation_params: BTreeMap::new(),
            extra_login_params: BTreeMap::new(),
            urlencode_params: default_urlencode_params(),
            sync_email: false,
            sync_username: false,
            complete_logout: false,
            request_timeout,
        }
    }

    /// # Errors
    ///
    /// `Configuration` for anything but 1 or 2.
    pub fn protocol_version(&self) -> Result<ProtocolVersion, DomainError> {
        ProtocolVersion::try_from(self.protocol).map_err(|v| {
            DomainError::configuration(format!(
                "unsupported CAS protocol version {v}; expected 1 or 2"
            ))
        })
    }

    /// Validation endpoint for the configured protocol.
    ///
    /// # Errors
    ///
    /// `Configuration` if the protocol is unsupported or the URL is invalid.
    pub fn validate_url(&self) -> Result<Url, DomainError> {
        let path = match self.protocol_version()? {
            ProtocolVersion::Cas1 => &self.cas1_validate_path,
            ProtocolVersion::Cas2 => &self.cas2_validate_path,
        };
        self.server_endpoint(path)
    }

    /// `server_url` joined with `path`.
    ///
    /// # Errors
    ///
    /// `Configuration` if the result is not an absolute URL.
    pub fn server_endpoint(&self, path: &str) -> Result<Url, DomainError> {
        let joined = if path.starts_with('/') {
            format!("{}{path}", self.server_url.trim_end_matches('/'))
        } else {
            format!("{}{path}", self.server_url)
        };
        Url::parse(&joined)
            .map_err(|e| DomainError::configuration(format!("invalid CAS URL '{joined}': {e}")))
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

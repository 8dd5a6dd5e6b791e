//! Login and logout redirect URLs for web handlers.

use std::collections::BTreeMap;

use url::Url;

use super::error::DomainError;
use super::query::append_query;
use crate::config::CasConsumerConfig;

/// Query parameter the provider's logout page reads its return URL from.
const LOGOUT_RETURN_PARAM: &str = "url";

/// Provider redirect URLs derived from the consumer configuration.
#[derive(Debug, Clone)]
pub struct RedirectUrls {
    login_endpoint: Url,
    logout_endpoint: Url,
    service_param: String,
    default_service: Option<String>,
    extra_login_params: BTreeMap<String, String>,
    urlencode_params: bool,
    complete_logout: bool,
}

impl RedirectUrls {
    /// # Errors
    ///
    /// `Configuration` if the login or logout endpoint is not a valid URL.
    pub fn from_config(cfg: &CasConsumerConfig) -> Result<Self, DomainError> {
        Ok(Self {
            login_endpoint: cfg.server_endpoint(&cfg.login_path)?,
            logout_endpoint: cfg.server_endpoint(&cfg.logout_path)?,
            service_param: cfg.service_param.clone(),
            default_service: cfg.service.clone(),
            extra_login_params: cfg.extra_login_params.clone(),
            urlencode_params: cfg.urlencode_params,
            complete_logout: cfg.complete_logout,
        })
    }

    /// Provider login page that returns to `service` with a ticket.
    #[must_use]
    pub fn login_url(&self, service: &str) -> Url {
        let mut url = self.login_endpoint.clone();
        let extra = self
            .extra_login_params
            .iter()
            .filter(|(k, _)| **k != self.service_param)
            .map(|(k, v)| (k.as_str(), v.as_str()));
        let pairs = std::iter::once((self.service_param.as_str(), service)).chain(extra);
        append_query(&mut url, pairs, self.urlencode_params);
        url
    }

    /// [`Self::login_url`] for the configured default service.
    ///
    /// # Errors
    ///
    /// `Configuration` if no default service is configured.
    pub fn default_login_url(&self) -> Result<Url, DomainError> {
        let service = self
            .default_service
            .as_deref()
            .ok_or_else(|| DomainError::configuration("no default CAS service URL configured"))?;
        Ok(self.login_url(service))
    }

    /// Where to send the browser after a local logout.
    ///
    /// With complete logout this is the provider's logout page, which returns
    /// to `next_page`; otherwise `next_page` itself.
    #[must_use]
    pub fn logout_url(&self, next_page: &str) -> String {
        if !self.complete_logout {
            return next_page.to_owned();
        }
        let mut url = self.logout_endpoint.clone();
        append_query(
            &mut url,
            [(LOGOUT_RETURN_PARAM, next_page)],
            self.urlencode_params,
        );
        url.into()
    }
}

/// Post-login redirect target that cannot leave `request_host`.
///
/// Falls back to `default` for an empty target, a target on another host, or
/// an absolute URL that is not http(s).
#[must_use]
pub fn safe_redirect_target(requested: &str, request_host: &str, default: &str) -> String {
    let requested = requested.trim();
    if requested.is_empty() {
        return default.to_owned();
    }

    // Browsers read `\` as `/` and drop tabs and newlines inside URLs.
    let normalized: String = requested
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .map(|c| if c == '\\' { '/' } else { c })
        .collect();

    let netloc = if let Some(rest) = normalized.strip_prefix("//") {
        Some(rest.split(['/', '?', '#']).next().unwrap_or_default().to_owned())
    } else if let Ok(url) = Url::parse(&normalized) {
        if !matches!(url.scheme(), "http" | "https") {
            return default.to_owned();
        }
        Some(netloc_of(&url))
    } else {
        None
    };

    match netloc {
        Some(netloc) if !netloc.eq_ignore_ascii_case(request_host) => default.to_owned(),
        _ => requested.to_owned(),
    }
}

fn netloc_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    }
}

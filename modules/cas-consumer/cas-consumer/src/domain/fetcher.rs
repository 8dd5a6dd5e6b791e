//! Transport for ticket validation requests.

use std::collections::BTreeMap;
use std::io::Read;

use bytes::Bytes;
use flate2::read::GzDecoder;
use reqwest::header::{ACCEPT_ENCODING, CONTENT_ENCODING, HeaderMap};
use tracing::{debug, info};
use url::Url;

use super::error::DomainError;
use super::query::append_query;
use crate::config::CasConsumerConfig;

/// Issues validation GETs against the provider and returns raw bodies.
#[derive(Debug, Clone)]
pub struct TicketFetcher {
    client: reqwest::Client,
    validate_url: Url,
    ticket_param: String,
    service_param: String,
    extra_params: BTreeMap<String, String>,
    urlencode_params: bool,
}

impl TicketFetcher {
    /// Build a fetcher for the configured protocol's validation endpoint.
    ///
    /// # Errors
    ///
    /// `Configuration` if the endpoint is invalid or the HTTP client cannot
    /// be built.
    pub fn from_config(cfg: &CasConsumerConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            validate_url: cfg.validate_url()?,
            ticket_param: cfg.ticket_param.clone(),
            service_param: cfg.service_param.clone(),
            extra_params: cfg.extra_validation_params.clone(),
            urlencode_params: cfg.urlencode_params,
        })
    }

    /// Full validation URL for one ticket.
    ///
    /// Ticket and service come first, then the extra parameters in key order.
    /// Extra parameters named like the ticket or service parameter are
    /// ignored.
    #[must_use]
    pub fn validation_url(&self, ticket: &str, service: &str) -> Url {
        let mut url = self.validate_url.clone();
        let extra = self
            .extra_params
            .iter()
            .filter(|(k, _)| **k != self.ticket_param && **k != self.service_param)
            .map(|(k, v)| (k.as_str(), v.as_str()));
        let pairs = [
            (self.ticket_param.as_str(), ticket),
            (self.service_param.as_str(), service),
        ]
        .into_iter()
        .chain(extra);

        append_query(&mut url, pairs, self.urlencode_params);
        url
    }

    /// Fetch the provider's answer for `ticket`.
    ///
    /// # Errors
    ///
    /// `Network` on transport failure, timeout, non-success status or an
    /// undecodable gzip body.
    pub async fn fetch(&self, ticket: &str, service: &str) -> Result<Bytes, DomainError> {
        let url = self.validation_url(ticket, service);
        info!(endpoint = %self.validate_url, "Validating ticket");

        let response = self
            .client
            .get(url)
            .header(ACCEPT_ENCODING, "gzip")
            .send()
            .await
            .map_err(|e| describe_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::network(format!(
                "validation endpoint answered {status}"
            )));
        }

        let gzipped = is_gzip(response.headers());
        let body = response.bytes().await.map_err(|e| describe_transport_error(&e))?;
        debug!(bytes = body.len(), gzipped, "Received validation response");

        if gzipped { gunzip(&body) } else { Ok(body) }
    }
}

fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("gzip"))
}

fn gunzip(body: &[u8]) -> Result<Bytes, DomainError> {
    let mut decoded = Vec::new();
    GzDecoder::new(body)
        .read_to_end(&mut decoded)
        .map_err(|e| DomainError::network(format!("invalid gzip response body: {e}")))?;
    Ok(Bytes::from(decoded))
}

fn describe_transport_error(e: &reqwest::Error) -> DomainError {
    if e.is_timeout() {
        DomainError::network(format!("validation request timed out: {e}"))
    } else {
        DomainError::network(format!("validation request failed: {e}"))
    }
}

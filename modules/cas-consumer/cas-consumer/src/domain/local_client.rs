//! Local (in-process) client for the CAS consumer.

use std::sync::Arc;

use async_trait::async_trait;
use cas_consumer_sdk::{
    CasConsumerClient, CasConsumerError, LocalUser, UserStoreError, ValidationContext,
};

use super::{DomainError, Service};

/// Local client wrapping the service.
///
/// Handed out by [`crate::CasConsumer::client`].
pub struct CasConsumerLocalClient {
    svc: Arc<Service>,
}

impl CasConsumerLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError, context: ValidationContext) -> CasConsumerError {
    tracing::error!(operation = op, context = %context, error = ?e, "cas_consumer call failed");
    e.into_client_error(context)
}

#[async_trait]
impl CasConsumerClient for CasConsumerLocalClient {
    async fn authenticate(
        &self,
        ticket: &str,
        service: &str,
    ) -> Result<Option<LocalUser>, CasConsumerError> {
        self.svc
            .authenticate(ticket, service)
            .await
            .map_err(|e| log_and_convert("authenticate", e, self.svc.context(ticket, service)))
    }

    async fn get_user(&self, id: i64) -> Result<Option<LocalUser>, CasConsumerError> {
        self.svc.get_user(id).await.map_err(|e| {
            tracing::error!(operation = "get_user", user_id = id, error = ?e, "cas_consumer call failed");
            match e {
                DomainError::Resolution(source) => CasConsumerError::Store(source),
                other => CasConsumerError::Store(UserStoreError::Internal(other.to_string())),
            }
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::time::Duration;

    use httpmock::Method::GET;
    use httpmock::MockServer;
    use tracing_test::traced_test;

    use super::*;
    use crate::config::CasConsumerConfig;
    use crate::test_support::RecordingUserStore;

    fn client(server: &MockServer, store: Arc<RecordingUserStore>) -> CasConsumerLocalClient {
        let cfg = CasConsumerConfig::new(server.base_url(), Duration::from_secs(5));
        let svc = Service::new(&cfg, store, Vec::new()).unwrap();
        CasConsumerLocalClient::new(Arc::new(svc))
    }

    #[tokio::test]
    #[traced_test]
    async fn network_error_carries_validation_context() {
        let server = MockServer::start_async().await;
        let _mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/cas/validate/");
                then.status(503);
            })
            .await;
        let client = client(&server, Arc::new(RecordingUserStore::default()));

        let err = client
            .authenticate("ST-1", "http://app/")
            .await
            .unwrap_err();

        match err {
            CasConsumerError::Network { context, message } => {
                assert_eq!(context.ticket, "ST-1");
                assert_eq!(context.service, "http://app/");
                assert!(message.contains("503"), "got {message}");
            }
            other => panic!("Expected Network, got: {other:?}"),
        }
        assert!(logs_contain("cas_consumer call failed"));
    }

    #[tokio::test]
    async fn store_error_maps_to_resolution() {
        let server = MockServer::start_async().await;
        let _mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/cas/validate/");
                then.status(200).body("yes\nfoo\n");
            })
            .await;
        let store = Arc::new(RecordingUserStore::default());
        store.fail_with(UserStoreError::Unavailable("db down".to_owned()));
        let client = client(&server, store);

        let err = client.authenticate("ST-1", "http://app/").await.unwrap_err();
        assert!(
            matches!(err, CasConsumerError::Resolution { source: UserStoreError::Unavailable(_), .. }),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn get_user_store_error_maps_to_store() {
        let server = MockServer::start_async().await;
        let store = Arc::new(RecordingUserStore::default());
        store.fail_with(UserStoreError::Unavailable("db down".to_owned()));
        let client = client(&server, store);

        let err = client.get_user(1).await.unwrap_err();
        assert!(matches!(err, CasConsumerError::Store(UserStoreError::Unavailable(_))));
    }
}

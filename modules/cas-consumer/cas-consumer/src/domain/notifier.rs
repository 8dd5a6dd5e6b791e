//! Best-effort delivery of CAS events to registered subscribers.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cas_consumer_sdk::{
    CasEvent, CasEventSubscriber, LocalUser, MergeCandidateSet, SubscriberError,
};
use futures::FutureExt;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Upper bound for one subscriber to handle one event.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Fans events out to subscribers in registration order.
///
/// Subscriber failures, panics and timeouts are logged and swallowed. Every
/// subscriber sees every event.
#[derive(Clone)]
pub struct Notifier {
    subscribers: Vec<Arc<dyn CasEventSubscriber>>,
    delivery_timeout: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Notifier {
    #[must_use]
    pub fn new(subscribers: Vec<Arc<dyn CasEventSubscriber>>) -> Self {
        Self {
            subscribers,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub async fn announce_authenticated(
        &self,
        user: &LocalUser,
        attributes: &BTreeMap<String, String>,
    ) {
        let event = CasEvent::Authenticated {
            user: user.clone(),
            attributes: attributes.clone(),
        };
        self.dispatch(&event).await;
    }

    pub async fn announce_merge_candidates(&self, candidates: &MergeCandidateSet) {
        let event = CasEvent::MergeCandidates {
            primary: candidates.primary.clone(),
            others: candidates.others.clone(),
        };
        self.dispatch(&event).await;
    }

    async fn dispatch(&self, event: &CasEvent) {
        for subscriber in &self.subscribers {
            let delivery = AssertUnwindSafe(subscriber.handle(event)).catch_unwind();
            let Ok(outcome) = tokio::time::timeout(self.delivery_timeout, delivery).await else {
                warn!(
                    subscriber = subscriber.name(),
                    event = event.kind(),
                    timeout = ?self.delivery_timeout,
                    "Event subscriber timed out (continuing)"
                );
                continue;
            };
            match outcome {
                Ok(Ok(())) => {
                    debug!(subscriber = subscriber.name(), event = event.kind(), "Event delivered");
                }
                Ok(Err(e)) => {
                    warn!(
                        subscriber = subscriber.name(),
                        event = event.kind(),
                        error = %e,
                        "Event subscriber failed (continuing)"
                    );
                }
                Err(_) => {
                    warn!(
                        subscriber = subscriber.name(),
                        event = event.kind(),
                        "Event subscriber panicked (continuing)"
                    );
                }
            }
        }
    }
}

/// Subscriber that republishes events on a tokio broadcast channel.
///
/// Lets code outside the consumer observe events without implementing
/// [`CasEventSubscriber`]. Slow receivers lag and lose the oldest events.
pub struct BroadcastSubscriber {
    sender: broadcast::Sender<CasEvent>,
}

impl BroadcastSubscriber {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CasEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl CasEventSubscriber for BroadcastSubscriber {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    async fn handle(&self, event: &CasEvent) -> Result<(), SubscriberError> {
        if self.sender.send(event.clone()).is_err() {
            debug!(event = event.kind(), "No broadcast receivers");
        }
        Ok(())
    }
}

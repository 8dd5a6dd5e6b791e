#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use async_trait::async_trait;
use cas_consumer_sdk::{
    CasEvent, CasEventSubscriber, Credential, LocalUser, NewLocalUser, SubscriberError, UserStore,
    UserStoreError,
};
use parking_lot::Mutex;

#[must_use]
pub fn user(id: i64, username: &str) -> LocalUser {
    LocalUser {
        id,
        username: username.to_owned(),
        email: None,
        is_active: true,
        credential: Credential::Unusable,
    }
}

#[derive(Default)]
struct StoreState {
    users: Vec<LocalUser>,
    lookups: usize,
    saves: usize,
    creates: usize,
    last_query: Vec<String>,
    read_error: Option<UserStoreError>,
    write_error: Option<UserStoreError>,
}

/// In-memory store that records every call.
#[derive(Default)]
pub struct RecordingUserStore {
    state: Mutex<StoreState>,
    reverse_results: bool,
}

impl RecordingUserStore {
    /// Active users with ids 1, 2, ... in the given order.
    #[must_use]
    pub fn with_users(usernames: &[&str]) -> Self {
        let users = (1..)
            .zip(usernames)
            .map(|(id, name)| user(id, name))
            .collect();
        Self {
            state: Mutex::new(StoreState {
                users,
                ..StoreState::default()
            }),
            reverse_results: false,
        }
    }

    /// Return lookup results in descending id order.
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.reverse_results = true;
        self
    }

    pub fn fail_with(&self, error: UserStoreError) {
        self.state.lock().read_error = Some(error);
    }

    pub fn fail_writes_with(&self, error: UserStoreError) {
        self.state.lock().write_error = Some(error);
    }

    #[must_use]
    pub fn users(&self) -> Vec<LocalUser> {
        self.state.lock().users.clone()
    }

    #[must_use]
    pub fn lookups(&self) -> usize {
        self.state.lock().lookups
    }

    #[must_use]
    pub fn saves(&self) -> usize {
        self.state.lock().saves
    }

    #[must_use]
    pub fn writes(&self) -> usize {
        let state = self.state.lock();
        state.saves + state.creates
    }

    #[must_use]
    pub fn last_query(&self) -> Vec<String> {
        self.state.lock().last_query.clone()
    }
}

#[async_trait]
impl UserStore for RecordingUserStore {
    async fn find_active_by_username_in(
        &self,
        usernames: &[String],
    ) -> Result<Vec<LocalUser>, UserStoreError> {
        let mut state = self.state.lock();
        state.lookups += 1;
        state.last_query = usernames.to_vec();
        if let Some(e) = &state.read_error {
            return Err(e.clone());
        }
        let mut found: Vec<_> = state
            .users
            .iter()
            .filter(|u| u.is_active && usernames.contains(&u.username))
            .cloned()
            .collect();
        found.sort_by_key(|u| u.id);
        if self.reverse_results {
            found.reverse();
        }
        Ok(found)
    }

    async fn create(&self, new_user: NewLocalUser) -> Result<LocalUser, UserStoreError> {
        let mut state = self.state.lock();
        if let Some(e) = &state.write_error {
            return Err(e.clone());
        }
        if state.users.iter().any(|u| u.username == new_user.username) {
            return Err(UserStoreError::Conflict(new_user.username));
        }
        state.creates += 1;
        let id = state.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let created = LocalUser {
            id,
            username: new_user.username,
            email: new_user.email,
            is_active: true,
            credential: new_user.credential,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn save(&self, user: &LocalUser) -> Result<(), UserStoreError> {
        let mut state = self.state.lock();
        if let Some(e) = &state.write_error {
            return Err(e.clone());
        }
        state.saves += 1;
        let slot = state
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(UserStoreError::NotFound(user.id))?;
        *slot = user.clone();
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<LocalUser>, UserStoreError> {
        let state = self.state.lock();
        if let Some(e) = &state.read_error {
            return Err(e.clone());
        }
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }
}

/// Subscriber that keeps every event it receives.
pub struct RecordingSubscriber {
    name: String,
    events: Mutex<Vec<CasEvent>>,
}

impl RecordingSubscriber {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            events: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn events(&self) -> Vec<CasEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl CasEventSubscriber for RecordingSubscriber {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &CasEvent) -> Result<(), SubscriberError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

pub struct FailingSubscriber;

#[async_trait]
impl CasEventSubscriber for FailingSubscriber {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn handle(&self, _event: &CasEvent) -> Result<(), SubscriberError> {
        Err(SubscriberError("mail server unreachable".to_owned()))
    }
}

pub struct PanickingSubscriber;

#[async_trait]
impl CasEventSubscriber for PanickingSubscriber {
    fn name(&self) -> &'static str {
        "panicking"
    }

    async fn handle(&self, _event: &CasEvent) -> Result<(), SubscriberError> {
        panic!("subscriber bug");
    }
}

/// Subscriber whose handler never completes.
pub struct HangingSubscriber;

#[async_trait]
impl CasEventSubscriber for HangingSubscriber {
    fn name(&self) -> &'static str {
        "hanging"
    }

    async fn handle(&self, _event: &CasEvent) -> Result<(), SubscriberError> {
        futures::future::pending::<()>().await;
        Ok(())
    }
}

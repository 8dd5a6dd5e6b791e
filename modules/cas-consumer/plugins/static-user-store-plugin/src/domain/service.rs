//! Service implementation for the static user store plugin.

use std::collections::BTreeMap;

use cas_consumer_sdk::{Credential, LocalUser, NewLocalUser, UserStoreError};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::StaticUserStorePluginConfig;

struct Inner {
    users: BTreeMap<i64, LocalUser>,
    next_id: i64,
}

impl Inner {
    fn username_taken(&self, username: &str, except_id: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except_id)
    }
}

/// Static user store service.
///
/// Users live in an id-ordered map behind a read-write lock. Usernames are
/// unique; every mutation checks and writes under one write lock.
pub struct StaticUserStore {
    inner: RwLock<Inner>,
}

impl Default for StaticUserStore {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                users: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl StaticUserStore {
    /// Create a store holding the configured seed users.
    ///
    /// A seed whose username repeats an earlier one is skipped.
    #[must_use]
    pub fn from_config(cfg: &StaticUserStorePluginConfig) -> Self {
        let store = Self::default();
        {
            let mut inner = store.inner.write();
            for seed in &cfg.users {
                if inner.username_taken(&seed.username, None) {
                    warn!(username = %seed.username, "Skipping duplicate seed user");
                    continue;
                }
                let id = inner.next_id;
                inner.next_id += 1;
                inner.users.insert(
                    id,
                    LocalUser {
                        id,
                        username: seed.username.clone(),
                        email: seed.email.clone(),
                        is_active: seed.is_active,
                        credential: Credential::Unusable,
                    },
                );
            }
            info!(user_count = inner.users.len(), "Seeded static user store");
        }
        store
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Active users named in `usernames`, ascending by id.
    #[must_use]
    pub fn find_active(&self, usernames: &[String]) -> Vec<LocalUser> {
        self.inner
            .read()
            .users
            .values()
            .filter(|u| u.is_active && usernames.contains(&u.username))
            .cloned()
            .collect()
    }

    /// # Errors
    ///
    /// `Conflict` if the username is taken.
    pub fn insert(&self, new_user: NewLocalUser) -> Result<LocalUser, UserStoreError> {
        let mut inner = self.inner.write();
        if inner.username_taken(&new_user.username, None) {
            return Err(UserStoreError::Conflict(format!(
                "username '{}' already exists",
                new_user.username
            )));
        }

        let id = inner.next_id;
        inner.next_id += 1;
        let user = LocalUser {
            id,
            username: new_user.username,
            email: new_user.email,
            is_active: true,
            credential: new_user.credential,
        };
        inner.users.insert(id, user.clone());
        debug!(user_id = id, username = %user.username, "Created user");
        Ok(user)
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown id, `Conflict` if a rename collides.
    pub fn update(&self, user: &LocalUser) -> Result<(), UserStoreError> {
        let mut inner = self.inner.write();
        if !inner.users.contains_key(&user.id) {
            return Err(UserStoreError::NotFound(user.id));
        }
        if inner.username_taken(&user.username, Some(user.id)) {
            return Err(UserStoreError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        inner.users.insert(user.id, user.clone());
        debug!(user_id = user.id, "Updated user");
        Ok(())
    }

    #[must_use]
    pub fn find_by_id(&self, id: i64) -> Option<LocalUser> {
        self.inner.read().users.get(&id).cloned()
    }
}

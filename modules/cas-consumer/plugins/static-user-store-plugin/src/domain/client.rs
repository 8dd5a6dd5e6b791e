//! `UserStore` implementation for the static user store plugin.

use async_trait::async_trait;
use cas_consumer_sdk::{LocalUser, NewLocalUser, UserStore, UserStoreError};

use super::service::StaticUserStore;

#[async_trait]
impl UserStore for StaticUserStore {
    async fn find_active_by_username_in(
        &self,
        usernames: &[String],
    ) -> Result<Vec<LocalUser>, UserStoreError> {
        Ok(self.find_active(usernames))
    }

    async fn create(&self, new_user: NewLocalUser) -> Result<LocalUser, UserStoreError> {
        self.insert(new_user)
    }

    async fn save(&self, user: &LocalUser) -> Result<(), UserStoreError> {
        self.update(user)
    }

    async fn get(&self, id: i64) -> Result<Option<LocalUser>, UserStoreError> {
        Ok(self.find_by_id(id))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use cas_consumer_sdk::Credential;

    use super::*;
    use crate::config::{SeedUser, StaticUserStorePluginConfig};

    #[tokio::test]
    async fn store_trait_round_trip() {
        let cfg = StaticUserStorePluginConfig {
            users: vec![SeedUser {
                username: "foo".to_owned(),
                email: None,
                is_active: true,
            }],
        };
        let service = StaticUserStore::from_config(&cfg);
        let store: &dyn UserStore = &service;

        let found = store
            .find_active_by_username_in(&["foo".to_owned(), "bar".to_owned()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let created = store
            .create(NewLocalUser {
                username: "bar".to_owned(),
                credential: Credential::Unusable,
                email: None,
            })
            .await
            .unwrap();
        assert_eq!(store.get(created.id).await.unwrap(), Some(created));
        assert_eq!(store.get(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_unknown_user_is_not_found() {
        let service = StaticUserStore::default();
        let store: &dyn UserStore = &service;
        let user = LocalUser {
            id: 7,
            username: "foo".to_owned(),
            email: None,
            is_active: true,
            credential: Credential::Unusable,
        };

        assert_eq!(store.save(&user).await, Err(UserStoreError::NotFound(7)));
    }
}

//! User store trait consumed by the CAS consumer.
//!
//! The store owns user records and their concurrency control. Each method is
//! a single atomic operation; uniqueness of usernames must be enforced by the
//! store, it is the only guard against concurrent duplicate creation.

use async_trait::async_trait;

use crate::error::UserStoreError;
use crate::models::{LocalUser, NewLocalUser};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Active users whose username is one of `usernames`, in ascending `id`
    /// order.
    ///
    /// # Errors
    ///
    /// Store-specific lookup failures.
    async fn find_active_by_username_in(
        &self,
        usernames: &[String],
    ) -> Result<Vec<LocalUser>, UserStoreError>;

    /// Persist a new user and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the username is taken
    async fn create(&self, new_user: NewLocalUser) -> Result<LocalUser, UserStoreError>;

    /// Overwrite the stored record with the same id.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record has this id
    /// - `Conflict` if a rename collides with another username
    async fn save(&self, user: &LocalUser) -> Result<(), UserStoreError>;

    /// # Errors
    ///
    /// Store-specific lookup failures.
    async fn get(&self, id: i64) -> Result<Option<LocalUser>, UserStoreError>;
}

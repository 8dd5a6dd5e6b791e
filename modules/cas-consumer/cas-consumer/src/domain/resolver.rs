//! Resolves validated CAS identities to local user records.

use std::collections::HashSet;
use std::sync::Arc;

use cas_consumer_sdk::{
    Credential, LocalUser, MergeCandidateSet, NewLocalUser, UserStore, ValidationResult,
};
use tracing::{debug, info, instrument};

use super::error::DomainError;
use crate::config::CasConsumerConfig;

/// Which local fields follow the provider's assertion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverPolicy {
    pub sync_email: bool,
    pub sync_username: bool,
}

impl ResolverPolicy {
    #[must_use]
    pub fn from_config(cfg: &CasConsumerConfig) -> Self {
        Self {
            sync_email: cfg.sync_email,
            sync_username: cfg.sync_username,
        }
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub user: LocalUser,
    /// Present when more than one local user matched.
    pub merge_candidates: Option<MergeCandidateSet>,
    /// The user did not exist before this resolution.
    pub created: bool,
}

pub struct IdentityResolver {
    store: Arc<dyn UserStore>,
    policy: ResolverPolicy,
}

impl IdentityResolver {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, policy: ResolverPolicy) -> Self {
        Self { store, policy }
    }

    /// Pick, update or create the local user for `validation`.
    ///
    /// Returns `None` for unsuccessful validations without touching the store.
    ///
    /// # Errors
    ///
    /// `Resolution` if any store operation fails.
    #[instrument(skip_all, fields(primary = %validation.primary_identifier()))]
    pub async fn resolve(
        &self,
        validation: &ValidationResult,
    ) -> Result<Option<Resolution>, DomainError> {
        if !validation.is_success() || validation.identifiers().is_empty() {
            return Ok(None);
        }

        let usernames = distinct(validation.identifiers());
        let mut matches = self.store.find_active_by_username_in(&usernames).await?;
        matches.sort_by_key(|user| user.id);
        info!(
            count = matches.len(),
            users = ?matches.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(),
            "Authentication turned up local users"
        );

        if matches.is_empty() {
            let user = self.create_user(validation).await?;
            return Ok(Some(Resolution {
                user,
                merge_candidates: None,
                created: true,
            }));
        }

        let winner = matches
            .iter()
            .position(|user| user.username == validation.primary_identifier())
            .unwrap_or(0);
        let mut user = matches.remove(winner);
        info!(user_id = user.id, username = %user.username, "Picking primary user");

        if self.reconcile(&mut user, validation) {
            self.store.save(&user).await?;
            debug!(user_id = user.id, "Saved reconciled user");
        }

        let merge_candidates = (!matches.is_empty()).then(|| MergeCandidateSet {
            primary: user.clone(),
            others: matches,
        });

        Ok(Some(Resolution {
            user,
            merge_candidates,
            created: false,
        }))
    }

    async fn create_user(&self, validation: &ValidationResult) -> Result<LocalUser, DomainError> {
        let username = validation.primary_identifier().to_owned();
        info!(username = %username, "Creating new user");

        let email = if self.policy.sync_email {
            asserted_email(validation).map(ToOwned::to_owned)
        } else {
            None
        };

        let user = self
            .store
            .create(NewLocalUser {
                username,
                credential: Credential::Unusable,
                email,
            })
            .await?;
        Ok(user)
    }

    /// Apply the sync policy; true if `user` changed.
    fn reconcile(&self, user: &mut LocalUser, validation: &ValidationResult) -> bool {
        let mut changed = false;

        if self.policy.sync_email
            && let Some(email) = asserted_email(validation)
            && user.email.as_deref() != Some(email)
        {
            debug!(user_id = user.id, "Updating email from CAS attributes");
            user.email = Some(email.to_owned());
            changed = true;
        }

        if self.policy.sync_username && user.username != validation.primary_identifier() {
            info!(
                user_id = user.id,
                from = %user.username,
                to = %validation.primary_identifier(),
                "Renaming user to primary identifier"
            );
            validation
                .primary_identifier()
                .clone_into(&mut user.username);
            changed = true;
        }

        changed
    }
}

/// The `email` attribute, unless the provider sent it blank.
fn asserted_email(validation: &ValidationResult) -> Option<&str> {
    validation
        .attribute("email")
        .map(str::trim)
        .filter(|email| !email.is_empty())
}

fn distinct(identifiers: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    identifiers
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

//! State repository trait

use async_trait::async_trait;

use super::entity::{DialogState, StateKey};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Persistence contract for dialog state.
///
/// `save` is an upsert keyed by `(platform, user_id)`; `load` returns
/// `Ok(None)` when the user is idle.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Insert or replace the row for the state's key
    async fn save(&self, state: &DialogState) -> Result<(), DomainError>;

    /// Load the row for a user, `None` when idle
    async fn load(&self, key: &StateKey) -> Result<Option<DialogState>, DomainError>;

    /// Delete the row for a user, returns true if a row existed
    async fn delete(&self, key: &StateKey) -> Result<bool, DomainError>;
}

//! In-memory dialog state repository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::state::{DialogState, StateKey, StateRepository};
use crate::domain::DomainError;

/// Thread-safe in-memory state store
///
/// Useful for the console channel and tests. State is lost when the process
/// terminates.
#[derive(Debug, Default)]
pub struct InMemoryStateRepository {
    states: RwLock<HashMap<StateKey, DialogState>>,
}

impl InMemoryStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with states
    pub fn with_states(states: Vec<DialogState>) -> Self {
        let map = states.into_iter().map(|state| (state.key(), state)).collect();
        Self {
            states: RwLock::new(map),
        }
    }

    /// Number of users with an active workflow
    pub fn active_count(&self) -> Result<usize, DomainError> {
        let states = self.states.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(states.len())
    }
}

#[async_trait]
impl StateRepository for InMemoryStateRepository {
    async fn save(&self, state: &DialogState) -> Result<(), DomainError> {
        let mut states = self.states.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        states.insert(state.key(), state.clone());
        Ok(())
    }

    async fn load(&self, key: &StateKey) -> Result<Option<DialogState>, DomainError> {
        let states = self.states.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(states.get(key).cloned())
    }

    async fn delete(&self, key: &StateKey) -> Result<bool, DomainError> {
        let mut states = self.states.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(states.remove(key).is_some())
    }
}

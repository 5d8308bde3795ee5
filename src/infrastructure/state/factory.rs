//! State repository factory for runtime backend selection

use std::sync::Arc;

use tracing::info;

use crate::domain::state::StateRepository;
use crate::domain::DomainError;

use super::in_memory::InMemoryStateRepository;
use super::postgres::{PostgresConfig, PostgresStateRepository};

/// Supported state backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateBackend {
    InMemory,
    Postgres,
}

impl StateBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// State store configuration
#[derive(Debug, Clone)]
pub enum StateStoreConfig {
    InMemory,
    Postgres(PostgresConfig),
}

impl StateStoreConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn postgres(config: PostgresConfig) -> Self {
        Self::Postgres(config)
    }

    pub fn backend(&self) -> StateBackend {
        match self {
            Self::InMemory => StateBackend::InMemory,
            Self::Postgres(_) => StateBackend::Postgres,
        }
    }
}

/// Factory for state repositories
#[derive(Debug)]
pub struct StateStoreFactory;

impl StateStoreFactory {
    pub async fn create(
        config: &StateStoreConfig,
    ) -> Result<Arc<dyn StateRepository>, DomainError> {
        match config {
            StateStoreConfig::InMemory => {
                info!("Using in-memory dialog state store");
                Ok(Arc::new(InMemoryStateRepository::new()))
            }
            StateStoreConfig::Postgres(pg_config) => {
                info!(table = %pg_config.table_name, "Using PostgreSQL dialog state store");
                let repo = PostgresStateRepository::connect(pg_config).await?;
                repo.ensure_table().await?;
                Ok(Arc::new(repo))
            }
        }
    }
}

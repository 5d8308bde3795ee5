//! PostgreSQL dialog state repository

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use crate::domain::state::{DialogState, StateKey, StateRepository};
use crate::domain::DomainError;

pub const DEFAULT_TABLE_NAME: &str = "dialog_states";

/// PostgreSQL connection configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Table holding one row per (platform, user_id)
    pub table_name: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/pmp_dialog_engine".to_string(),
            max_connections: 10,
            connect_timeout_secs: 30,
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }
}

/// State repository backed by a single PostgreSQL table.
///
/// The full state is kept as JSONB next to the routing columns; `save` is an
/// upsert on `(platform, user_id)` so the last writer wins.
pub struct PostgresStateRepository {
    pool: PgPool,
    table_name: String,
}

impl Debug for PostgresStateRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStateRepository")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl PostgresStateRepository {
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Result<Self, DomainError> {
        let table_name = table_name.into();
        validate_table_name(&table_name)?;
        Ok(Self { pool, table_name })
    }

    /// Connect with a fresh pool
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Self::new(pool, config.table_name.clone())
    }

    /// Ensures the state table exists
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                platform VARCHAR(64) NOT NULL,
                user_id VARCHAR(255) NOT NULL,
                workflow_id VARCHAR(64) NOT NULL,
                current_step VARCHAR(64) NOT NULL,
                state JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (platform, user_id)
            )
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        Ok(())
    }
}

fn validate_table_name(name: &str) -> Result<(), DomainError> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());

    if valid {
        Ok(())
    } else {
        Err(DomainError::configuration(format!(
            "Invalid state table name '{}'",
            name
        )))
    }
}

#[async_trait]
impl StateRepository for PostgresStateRepository {
    async fn save(&self, state: &DialogState) -> Result<(), DomainError> {
        let data = serde_json::to_value(state)
            .map_err(|e| DomainError::storage(format!("Failed to serialize state: {}", e)))?;

        let query = format!(
            r#"
            INSERT INTO {} (platform, user_id, workflow_id, current_step, state, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (platform, user_id) DO UPDATE SET
                workflow_id = EXCLUDED.workflow_id,
                current_step = EXCLUDED.current_step,
                state = EXCLUDED.state,
                updated_at = EXCLUDED.updated_at
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .bind(state.platform())
            .bind(state.user_id())
            .bind(state.workflow_id().as_str())
            .bind(state.current_step().as_str())
            .bind(&data)
            .bind(state.updated_at())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to save state: {}", e)))?;

        Ok(())
    }

    async fn load(&self, key: &StateKey) -> Result<Option<DialogState>, DomainError> {
        let query = format!(
            "SELECT state FROM {} WHERE platform = $1 AND user_id = $2",
            self.table_name
        );

        let row = sqlx::query(&query)
            .bind(&key.platform)
            .bind(&key.user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to load state: {}", e)))?;

        match row {
            Some(row) => {
                let data: serde_json::Value = row.get("state");
                let state = serde_json::from_value(data).map_err(|e| {
                    DomainError::storage(format!("Failed to deserialize state: {}", e))
                })?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &StateKey) -> Result<bool, DomainError> {
        let query = format!(
            "DELETE FROM {} WHERE platform = $1 AND user_id = $2",
            self.table_name
        );

        let result = sqlx::query(&query)
            .bind(&key.platform)
            .bind(&key.user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete state: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_config_default() {
        let config = PostgresConfig::default();

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.table_name, DEFAULT_TABLE_NAME);
    }

    #[test]
    fn test_postgres_config_builder() {
        let config = PostgresConfig::new("postgres://localhost/test")
            .with_max_connections(3)
            .with_table_name("bot_states");

        assert_eq!(config.url, "postgres://localhost/test");
        assert_eq!(config.max_connections, 3);
        assert_eq!(config.table_name, "bot_states");
    }

    #[test]
    fn test_table_name_validation() {
        assert!(validate_table_name("dialog_states").is_ok());
        assert!(validate_table_name("states; DROP TABLE users").is_err());
        assert!(validate_table_name("1states").is_err());
        assert!(validate_table_name("").is_err());
    }
}

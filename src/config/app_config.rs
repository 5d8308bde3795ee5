use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::engine::{EngineConfig, DEFAULT_MAX_TRANSITIONS};
use crate::infrastructure::messenger::TextMessengerConfig;
use crate::infrastructure::state::{
    PostgresConfig, StateBackend, StateStoreConfig, DEFAULT_TABLE_NAME,
};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub engine: EngineSettings,
    pub storage: StorageSettings,
    pub dialog: DialogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub max_transitions: usize,
    pub default_workflow: String,
    pub serialize_per_user: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// `memory` or `postgres`
    pub backend: String,
    pub postgres_url: Option<String>,
    pub table_name: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DialogSettings {
    pub items_per_page: usize,
    pub choice_ttl_secs: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_transitions: DEFAULT_MAX_TRANSITIONS,
            default_workflow: "onboarding".to_string(),
            serialize_per_user: true,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            postgres_url: None,
            table_name: DEFAULT_TABLE_NAME.to_string(),
            max_connections: 10,
        }
    }
}

impl Default for DialogSettings {
    fn default() -> Self {
        Self {
            items_per_page: 5,
            choice_ttl_secs: 3600,
        }
    }
}

impl EngineSettings {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_max_transitions(self.max_transitions)
            .with_serialize_per_user(self.serialize_per_user)
    }
}

impl StorageSettings {
    pub fn state_store_config(&self) -> Result<StateStoreConfig, config::ConfigError> {
        let backend = StateBackend::parse(&self.backend).ok_or_else(|| {
            config::ConfigError::Message(format!("Unknown storage backend '{}'", self.backend))
        })?;

        match backend {
            StateBackend::InMemory => Ok(StateStoreConfig::in_memory()),
            StateBackend::Postgres => {
                let url = self.postgres_url.clone().ok_or_else(|| {
                    config::ConfigError::Message(
                        "storage.postgres_url is required for the postgres backend".to_string(),
                    )
                })?;

                Ok(StateStoreConfig::postgres(
                    PostgresConfig::new(url)
                        .with_max_connections(self.max_connections)
                        .with_table_name(self.table_name.clone()),
                ))
            }
        }
    }
}

impl DialogSettings {
    pub fn text_messenger_config(&self) -> TextMessengerConfig {
        TextMessengerConfig::default().with_choice_ttl(Duration::from_secs(self.choice_ttl_secs))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.engine.max_transitions, 20);
        assert_eq!(config.engine.default_workflow, "onboarding");
        assert!(config.engine.serialize_per_user);
        assert_eq!(config.dialog.items_per_page, 5);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_source_keeps_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("engine.max_transitions", 5)
            .unwrap()
            .set_override("logging.format", "json")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.engine.max_transitions, 5);
        assert_eq!(config.engine.default_workflow, "onboarding");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.engine.engine_config().max_transitions, 5);
    }

    #[test]
    fn test_state_store_config() {
        let memory = StorageSettings::default().state_store_config().unwrap();
        assert_eq!(memory.backend(), StateBackend::InMemory);

        let missing_url = StorageSettings {
            backend: "postgres".to_string(),
            ..Default::default()
        };
        assert!(missing_url.state_store_config().is_err());

        let postgres = StorageSettings {
            backend: "postgres".to_string(),
            postgres_url: Some("postgres://localhost/dialogs".to_string()),
            ..Default::default()
        };
        assert_eq!(
            postgres.state_store_config().unwrap().backend(),
            StateBackend::Postgres
        );

        let unknown = StorageSettings {
            backend: "redis".to_string(),
            ..Default::default()
        };
        assert!(unknown.state_store_config().is_err());
    }
}

mod app_config;

pub use app_config::{
    AppConfig, DialogSettings, EngineSettings, LogFormat, LoggingConfig, StorageSettings,
};

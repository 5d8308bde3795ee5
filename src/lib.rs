//! PMP Dialog Engine
//!
//! Guided, multi-step conversations over chat platforms:
//! - Workflows as registries of steps with an immutable registry
//! - A dialog engine that persists per-user state between messages
//! - Text channels that render keyboards as numbered choices
//! - In-memory and PostgreSQL state backends

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod workflows;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use domain::messenger::{ChoiceResolver, Messenger};
use domain::workflow::WorkflowRegistry;
use infrastructure::account::InMemoryAccountService;
use infrastructure::engine::DialogEngine;
use infrastructure::messenger::{
    ConsoleTransport, MessengerRouter, TextMessenger, TracingMessageListener,
};
use infrastructure::state::StateStoreFactory;
use workflows::{build_registry, WorkflowServices, WorkflowSettings};

/// Channel side of a console session: the text adapter doubles as the
/// choice resolver for numbered replies
#[derive(Debug, Clone)]
pub struct ConsoleChannel {
    pub messenger: Arc<TextMessenger>,
    pub router: Arc<MessengerRouter>,
}

/// Wire the console transport behind a router registered for `platform`
pub fn create_console_channel(config: &AppConfig, platform: &str) -> ConsoleChannel {
    let messenger = Arc::new(
        TextMessenger::with_config(
            Arc::new(ConsoleTransport::new()),
            config.dialog.text_messenger_config(),
        )
        .with_listener(Arc::new(TracingMessageListener)),
    );

    let router = MessengerRouter::new().with_platform(platform, messenger.clone());

    ConsoleChannel {
        messenger,
        router: Arc::new(router),
    }
}

/// Build and validate every workflow against the given collaborators
pub fn create_registry(
    config: &AppConfig,
    messenger: Arc<dyn Messenger>,
) -> anyhow::Result<WorkflowRegistry> {
    let services = WorkflowServices::new(
        messenger,
        Arc::new(InMemoryAccountService::with_demo_data()),
    );
    let settings = WorkflowSettings {
        items_per_page: config.dialog.items_per_page,
        default_workflow: config.engine.default_workflow.clone(),
    };

    Ok(build_registry(&services, &settings)?)
}

/// Create the engine for the interactive console channel
pub async fn create_console_engine(
    config: &AppConfig,
    channel: &ConsoleChannel,
) -> anyhow::Result<DialogEngine> {
    let registry = create_registry(config, channel.router.clone())?;
    info!(
        workflows = registry.len(),
        default = %registry.default_workflow_id(),
        "Workflow registry built"
    );

    let store = StateStoreFactory::create(&config.storage.state_store_config()?).await?;
    let resolver: Arc<dyn ChoiceResolver> = channel.messenger.clone();

    Ok(DialogEngine::new(Arc::new(registry), store)
        .with_config(config.engine.engine_config())
        .with_choice_resolver(resolver))
}

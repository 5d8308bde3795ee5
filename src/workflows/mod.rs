//! Concrete dialog workflows
//!
//! - `onboarding`: greet, optionally pick a school group from a deep link,
//!   collect phone and name, register, then chain to `menu`
//! - `menu`: profile, rate an order (chains to `rating`) or log out
//! - `rating`: pick an order, score it, optionally comment, then back to `menu`
//!
//! All workflows are built once with their collaborators injected and
//! frozen into a [`WorkflowRegistry`].

mod common;
mod menu;
mod onboarding;
mod rating;

use std::fmt;
use std::sync::Arc;

use crate::domain::account::AccountService;
use crate::domain::messenger::Messenger;
use crate::domain::workflow::{WorkflowError, WorkflowId, WorkflowRegistry};

pub const ONBOARDING: WorkflowId = WorkflowId::from_static("onboarding");
pub const MENU: WorkflowId = WorkflowId::from_static("menu");
pub const RATING: WorkflowId = WorkflowId::from_static("rating");

pub const DEFAULT_ITEMS_PER_PAGE: usize = 5;

/// Collaborators shared by every step
#[derive(Clone)]
pub struct WorkflowServices {
    pub messenger: Arc<dyn Messenger>,
    pub accounts: Arc<dyn AccountService>,
}

impl fmt::Debug for WorkflowServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowServices")
            .field("messenger", &self.messenger)
            .finish_non_exhaustive()
    }
}

impl WorkflowServices {
    pub fn new(messenger: Arc<dyn Messenger>, accounts: Arc<dyn AccountService>) -> Self {
        Self {
            messenger,
            accounts,
        }
    }
}

/// Presentation knobs for the workflows
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub items_per_page: usize,
    pub default_workflow: String,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            default_workflow: ONBOARDING.to_string(),
        }
    }
}

/// Build and validate every workflow
pub fn build_registry(
    services: &WorkflowServices,
    settings: &WorkflowSettings,
) -> Result<WorkflowRegistry, WorkflowError> {
    let default_workflow = WorkflowId::new(settings.default_workflow.clone())?;
    let items_per_page = settings.items_per_page.max(1);

    WorkflowRegistry::builder(default_workflow)
        .with_workflow(onboarding::workflow(services, items_per_page)?)
        .with_workflow(menu::workflow(services)?)
        .with_workflow(rating::workflow(services, items_per_page)?)
        .build()
}

#[cfg(test)]
pub(crate) mod harness {
    use std::sync::Arc;

    use super::{build_registry, WorkflowServices, WorkflowSettings};
    use crate::domain::messenger::mock::RecordingMessenger;
    use crate::domain::messenger::ChatRef;
    use crate::domain::state::{DialogState, StateKey};
    use crate::infrastructure::account::InMemoryAccountService;
    use crate::infrastructure::engine::DialogEngine;
    use crate::infrastructure::state::InMemoryStateRepository;

    /// Engine wired to the real workflows with recording collaborators
    pub struct Harness {
        pub engine: DialogEngine,
        pub messenger: Arc<RecordingMessenger>,
        pub accounts: Arc<InMemoryAccountService>,
        pub chat: ChatRef,
    }

    impl Harness {
        pub fn new() -> Self {
            Self::with_accounts(InMemoryAccountService::with_demo_data())
        }

        pub fn with_accounts(accounts: InMemoryAccountService) -> Self {
            let messenger = Arc::new(RecordingMessenger::new());
            let accounts = Arc::new(accounts);
            let services = WorkflowServices::new(messenger.clone(), accounts.clone());
            let registry = build_registry(&services, &WorkflowSettings::default()).unwrap();
            let engine = DialogEngine::new(
                Arc::new(registry),
                Arc::new(InMemoryStateRepository::new()),
            );

            Self {
                engine,
                messenger,
                accounts,
                chat: ChatRef::direct("console", "42"),
            }
        }

        pub async fn state(&self) -> Option<DialogState> {
            self.engine
                .current_state(&StateKey::from(&self.chat))
                .await
                .unwrap()
        }

        pub async fn position(&self) -> Option<(String, String)> {
            self.state().await.map(|state| {
                (
                    state.workflow_id().to_string(),
                    state.current_step().to_string(),
                )
            })
        }

        pub async fn say(&self, text: &str) {
            self.engine
                .handle_message(&self.chat, text, None)
                .await
                .unwrap();
        }

        pub async fn press(&self, token: &str) {
            self.engine
                .handle_callback(&self.chat, token, None)
                .await
                .unwrap();
        }

        pub async fn share_contact(&self, phone: &str) {
            self.engine.handle_contact(&self.chat, phone).await.unwrap();
        }

        /// Run onboarding without deep link up to the main menu
        pub async fn register(&self, name: &str) {
            self.engine.handle_start(&self.chat, None).await.unwrap();
            self.share_contact("+1 555 010 2030").await;
            self.say(name).await;
        }
    }
}

//! Account menu

use async_trait::async_trait;

use super::common::{linked_account, typed_text};
use super::{WorkflowServices, MENU, ONBOARDING, RATING};
use crate::domain::input::UserInput;
use crate::domain::state::DialogState;
use crate::domain::workflow::{Step, StepId, StepOutcome, StepResult, Workflow, WorkflowError, WorkflowId};

pub const PROFILE_LABEL: &str = "My profile";
pub const RATE_LABEL: &str = "Rate an order";
pub const LOGOUT_LABEL: &str = "Log out";

const MAIN: StepId = StepId::from_static("main");
const PROFILE: StepId = StepId::from_static("profile");

pub(super) fn workflow(services: &WorkflowServices) -> Result<Workflow, WorkflowError> {
    Workflow::builder(MENU, MAIN)
        .with_name("Main menu")
        .with_step(MainStep {
            services: services.clone(),
        })
        .with_step(ProfileStep {
            services: services.clone(),
        })
        .build()
}

fn menu_rows() -> Vec<Vec<String>> {
    vec![
        vec![PROFILE_LABEL.to_string(), RATE_LABEL.to_string()],
        vec![LOGOUT_LABEL.to_string()],
    ]
}

#[derive(Debug)]
struct MainStep {
    services: WorkflowServices,
}

#[async_trait]
impl Step for MainStep {
    fn id(&self) -> StepId {
        MAIN
    }

    fn transitions(&self) -> Vec<StepId> {
        vec![PROFILE]
    }

    fn chains_to(&self) -> Vec<WorkflowId> {
        vec![RATING, ONBOARDING]
    }

    async fn enter(&self, state: &DialogState) -> StepResult {
        let chat = state.chat();

        if linked_account(&self.services, state).await?.is_none() {
            self.services
                .messenger
                .send_text(&chat, "Let's get you registered first.")
                .await?;
            return Ok(StepOutcome::chain_to(&ONBOARDING));
        }

        self.services
            .messenger
            .send_menu(&chat, "What would you like to do?", &menu_rows())
            .await?;
        Ok(StepOutcome::stay())
    }

    async fn handle_input(&self, state: &DialogState, input: &UserInput) -> StepResult {
        let chat = state.chat();

        match typed_text(input) {
            Some(text) if text.eq_ignore_ascii_case(PROFILE_LABEL) => {
                Ok(StepOutcome::go_to(PROFILE))
            }
            Some(text) if text.eq_ignore_ascii_case(RATE_LABEL) => {
                Ok(StepOutcome::chain_to(&RATING))
            }
            Some(text) if text.eq_ignore_ascii_case(LOGOUT_LABEL) => {
                self.services
                    .messenger
                    .send_text(&chat, "You're logged out. Send any message to come back.")
                    .await?;
                Ok(StepOutcome::complete())
            }
            _ => {
                self.services
                    .messenger
                    .send_menu(&chat, "Please choose one of the options.", &menu_rows())
                    .await?;
                Ok(StepOutcome::stay())
            }
        }
    }
}

/// Shows the profile and falls straight back to the main menu
#[derive(Debug)]
struct ProfileStep {
    services: WorkflowServices,
}

#[async_trait]
impl Step for ProfileStep {
    fn id(&self) -> StepId {
        PROFILE
    }

    fn transitions(&self) -> Vec<StepId> {
        vec![MAIN]
    }

    async fn enter(&self, state: &DialogState) -> StepResult {
        if let Some(account) = linked_account(&self.services, state).await? {
            let mut profile = format!("Name: {}\nPhone: {}", account.name, account.phone);
            if let Some(group) = &account.group_id {
                profile.push_str(&format!("\nGroup: {}", group));
            }
            profile.push_str(&format!(
                "\nMember since: {}",
                account.created_at.format("%Y-%m-%d")
            ));

            self.services
                .messenger
                .send_text(&state.chat(), &profile)
                .await?;
        }

        Ok(StepOutcome::go_to(MAIN))
    }

    async fn handle_input(&self, _state: &DialogState, _input: &UserInput) -> StepResult {
        Ok(StepOutcome::go_to(MAIN))
    }
}

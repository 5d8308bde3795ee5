//! Onboarding: welcome, optional school group, contact, name, registration

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::common::{linked_account, show_grid, typed_text, ListAction, LIST_MESSAGE_KEY};
use super::{WorkflowServices, MENU, ONBOARDING};
use crate::domain::account::{Account, Group};
use crate::domain::input::{normalize_phone, CallbackData, DeepLinkData, UserInput};
use crate::domain::messenger::Button;
use crate::domain::pagination::PaginationState;
use crate::domain::state::DialogState;
use crate::domain::workflow::{Step, StepId, StepOutcome, StepResult, Workflow, WorkflowError, WorkflowId};
use crate::domain::DomainError;

/// Deep-link kind that routes through group selection
pub const SCHOOL_LINK: &str = "school";

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnboardingStep {
    Welcome,
    SelectGroup,
    RequestContact,
    AskName,
    Register,
}

impl OnboardingStep {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::SelectGroup => "select_group",
            Self::RequestContact => "request_contact",
            Self::AskName => "ask_name",
            Self::Register => "register",
        }
    }

    const fn id(self) -> StepId {
        StepId::from_static(self.as_str())
    }
}

/// Typed view of the onboarding data bag
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct OnboardingData {
    deep_link: Option<DeepLinkData>,
    phone: Option<String>,
    name: Option<String>,
    group_id: Option<String>,
    group_name: Option<String>,
    list_message_id: Option<String>,
}

impl OnboardingData {
    fn from_state(state: &DialogState) -> Result<Self, WorkflowError> {
        state.data().extract()
    }

    /// School code when the user arrived through a school invite
    fn school_code(&self) -> Option<&str> {
        self.deep_link
            .as_ref()
            .filter(|link| link.is_kind(SCHOOL_LINK) && link.has_code())
            .map(|link| link.code.as_str())
    }
}

pub(super) fn workflow(
    services: &WorkflowServices,
    items_per_page: usize,
) -> Result<Workflow, WorkflowError> {
    Workflow::builder(ONBOARDING, OnboardingStep::Welcome.id())
        .with_name("Onboarding")
        .with_step(WelcomeStep {
            services: services.clone(),
        })
        .with_step(SelectGroupStep {
            services: services.clone(),
            items_per_page,
        })
        .with_step(RequestContactStep {
            services: services.clone(),
        })
        .with_step(AskNameStep {
            services: services.clone(),
        })
        .with_step(RegisterStep {
            services: services.clone(),
        })
        .build()
}

#[derive(Debug)]
struct WelcomeStep {
    services: WorkflowServices,
}

#[async_trait]
impl Step for WelcomeStep {
    fn id(&self) -> StepId {
        OnboardingStep::Welcome.id()
    }

    fn transitions(&self) -> Vec<StepId> {
        vec![
            OnboardingStep::SelectGroup.id(),
            OnboardingStep::RequestContact.id(),
        ]
    }

    fn chains_to(&self) -> Vec<WorkflowId> {
        vec![MENU]
    }

    async fn enter(&self, state: &DialogState) -> StepResult {
        let chat = state.chat();

        if let Some(account) = linked_account(&self.services, state).await? {
            self.services
                .messenger
                .send_text(&chat, &format!("Welcome back, {}!", account.name))
                .await?;
            return Ok(StepOutcome::chain_to(&MENU));
        }

        self.services
            .messenger
            .send_text(&chat, "Hi! Let's get you set up, it only takes a minute.")
            .await?;

        let data = OnboardingData::from_state(state)?;
        if data.school_code().is_some() {
            Ok(StepOutcome::go_to(OnboardingStep::SelectGroup.id()))
        } else {
            Ok(StepOutcome::go_to(OnboardingStep::RequestContact.id()))
        }
    }

    async fn handle_input(&self, _state: &DialogState, _input: &UserInput) -> StepResult {
        Ok(StepOutcome::go_to(OnboardingStep::RequestContact.id()))
    }
}

#[derive(Debug)]
struct SelectGroupStep {
    services: WorkflowServices,
    items_per_page: usize,
}

impl SelectGroupStep {
    const PROMPT: &'static str = "Which group are you in?";

    fn button(group: &Group) -> Button {
        Button::new(group.name.clone(), CallbackData::select(group.id.clone()))
    }

    /// Groups for the invite; `None` when the school code is unknown
    async fn groups(&self, data: &OnboardingData) -> Result<Option<Vec<Group>>, WorkflowError> {
        let Some(code) = data.school_code() else {
            return Ok(None);
        };

        match self.services.accounts.list_groups(code).await {
            Ok(groups) if groups.is_empty() => Ok(None),
            Ok(groups) => Ok(Some(groups)),
            Err(DomainError::NotFound { .. }) => {
                warn!(school = code, "Unknown school in invite link");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn skip_selection(&self, state: &DialogState) -> StepResult {
        self.services
            .messenger
            .send_text(
                &state.chat(),
                "This invite link is no longer valid, continuing without a group.",
            )
            .await?;
        Ok(StepOutcome::go_to(OnboardingStep::RequestContact.id()))
    }

    async fn show_page(
        &self,
        state: &DialogState,
        groups: &[Group],
        pagination: PaginationState,
        message_id: Option<&str>,
    ) -> StepResult {
        let rows = pagination.grid(groups, Self::button);
        let message_id = show_grid(
            self.services.messenger.as_ref(),
            &state.chat(),
            Self::PROMPT,
            &rows,
            message_id,
        )
        .await?;

        let mut outcome = StepOutcome::stay().with_pagination(pagination);
        if let Some(id) = message_id {
            outcome = outcome.with_update(LIST_MESSAGE_KEY, id);
        }
        Ok(outcome)
    }
}

#[async_trait]
impl Step for SelectGroupStep {
    fn id(&self) -> StepId {
        OnboardingStep::SelectGroup.id()
    }

    fn transitions(&self) -> Vec<StepId> {
        vec![OnboardingStep::RequestContact.id()]
    }

    async fn enter(&self, state: &DialogState) -> StepResult {
        let data = OnboardingData::from_state(state)?;
        let Some(groups) = self.groups(&data).await? else {
            return self.skip_selection(state).await;
        };

        let pagination = PaginationState::new(groups.len(), self.items_per_page);
        self.show_page(state, &groups, pagination, None).await
    }

    async fn handle_input(&self, state: &DialogState, input: &UserInput) -> StepResult {
        let data = OnboardingData::from_state(state)?;
        let Some(groups) = self.groups(&data).await? else {
            return self.skip_selection(state).await;
        };

        match ListAction::from_input(input) {
            ListAction::Page(page) => {
                let pagination =
                    PaginationState::new(groups.len(), self.items_per_page).with_page(page);
                debug!(page = pagination.current_page, "Group list page turned");
                self.show_page(state, &groups, pagination, data.list_message_id.as_deref())
                    .await
            }
            ListAction::Select(id) => match groups.iter().find(|group| group.id == id) {
                Some(group) => Ok(StepOutcome::go_to(OnboardingStep::RequestContact.id())
                    .with_update("group_id", group.id.clone())
                    .with_update("group_name", group.name.clone())),
                None => self.remind(state).await,
            },
            ListAction::Ignore => Ok(StepOutcome::stay()),
            ListAction::Back | ListAction::Unrecognized => self.remind(state).await,
        }
    }
}

impl SelectGroupStep {
    async fn remind(&self, state: &DialogState) -> StepResult {
        self.services
            .messenger
            .send_text(&state.chat(), "Please pick your group from the list.")
            .await?;
        Ok(StepOutcome::stay())
    }
}

#[derive(Debug)]
struct RequestContactStep {
    services: WorkflowServices,
}

#[async_trait]
impl Step for RequestContactStep {
    fn id(&self) -> StepId {
        OnboardingStep::RequestContact.id()
    }

    fn transitions(&self) -> Vec<StepId> {
        vec![OnboardingStep::AskName.id()]
    }

    async fn enter(&self, state: &DialogState) -> StepResult {
        self.services
            .messenger
            .send_contact_request(
                &state.chat(),
                "Please share your phone number so we can find your orders.",
                "Share contact",
            )
            .await?;
        Ok(StepOutcome::stay())
    }

    async fn handle_input(&self, state: &DialogState, input: &UserInput) -> StepResult {
        match input.phone_or_text().map(normalize_phone) {
            Some(Ok(phone)) => {
                Ok(StepOutcome::go_to(OnboardingStep::AskName.id()).with_update("phone", phone))
            }
            _ => {
                self.services
                    .messenger
                    .send_text(
                        &state.chat(),
                        "That doesn't look like a phone number. Please try again.",
                    )
                    .await?;
                Ok(StepOutcome::stay())
            }
        }
    }
}

#[derive(Debug)]
struct AskNameStep {
    services: WorkflowServices,
}

#[async_trait]
impl Step for AskNameStep {
    fn id(&self) -> StepId {
        OnboardingStep::AskName.id()
    }

    fn transitions(&self) -> Vec<StepId> {
        vec![OnboardingStep::Register.id()]
    }

    async fn enter(&self, state: &DialogState) -> StepResult {
        self.services
            .messenger
            .send_text(&state.chat(), "What should we call you?")
            .await?;
        Ok(StepOutcome::stay())
    }

    async fn handle_input(&self, state: &DialogState, input: &UserInput) -> StepResult {
        let name = typed_text(input).filter(|name| {
            (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name.chars().count())
        });

        match name {
            Some(name) => {
                Ok(StepOutcome::go_to(OnboardingStep::Register.id()).with_update("name", name))
            }
            None => {
                self.services
                    .messenger
                    .send_text(
                        &state.chat(),
                        &format!(
                            "Please enter your name ({} to {} characters).",
                            NAME_MIN_CHARS, NAME_MAX_CHARS
                        ),
                    )
                    .await?;
                Ok(StepOutcome::stay())
            }
        }
    }
}

#[derive(Debug)]
struct RegisterStep {
    services: WorkflowServices,
}

#[async_trait]
impl Step for RegisterStep {
    fn id(&self) -> StepId {
        OnboardingStep::Register.id()
    }

    fn chains_to(&self) -> Vec<WorkflowId> {
        vec![MENU]
    }

    async fn enter(&self, state: &DialogState) -> StepResult {
        let chat = state.chat();
        let data = OnboardingData::from_state(state)?;
        let (Some(phone), Some(name)) = (data.phone, data.name) else {
            return Err(WorkflowError::step_failed(
                OnboardingStep::Register.as_str(),
                "phone and name must be collected before registration",
            ));
        };

        self.services.messenger.send_typing(&chat).await?;

        let account = Account::new(state.platform(), state.user_id(), phone, name)
            .with_group(data.group_id);
        let account = match self.services.accounts.register(account).await {
            Ok(account) => account,
            Err(e) => {
                self.services
                    .messenger
                    .send_text(
                        &chat,
                        "Sorry, we couldn't complete your registration. Please try again later.",
                    )
                    .await?;
                return Err(e.into());
            }
        };

        let greeting = match data.group_name {
            Some(group) => format!("Thanks, {}! You're registered in {}.", account.name, group),
            None => format!("Thanks, {}! You're all set.", account.name),
        };
        self.services.messenger.send_text(&chat, &greeting).await?;

        Ok(StepOutcome::chain_to(&MENU))
    }

    async fn handle_input(&self, state: &DialogState, _input: &UserInput) -> StepResult {
        self.enter(state).await
    }
}

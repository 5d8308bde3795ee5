//! Order rating: pick an order, score it, optionally comment, submit

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::common::{linked_account, show_grid, typed_text, ListAction, LIST_MESSAGE_KEY};
use super::{WorkflowServices, MENU, ONBOARDING, RATING};
use crate::domain::account::{Order, Rating, MAX_SCORE, MIN_SCORE};
use crate::domain::input::{CallbackData, UserInput};
use crate::domain::messenger::{Button, ButtonRow};
use crate::domain::pagination::PaginationState;
use crate::domain::state::DialogState;
use crate::domain::workflow::{Step, StepId, StepOutcome, StepResult, Workflow, WorkflowError, WorkflowId};

pub const ORDER_KEY: &str = "rating_order_number";
pub const SCORE_KEY: &str = "rating_score";
pub const COMMENT_KEY: &str = "rating_comment";

const MAX_COMMENT_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RatingStep {
    SelectOrder,
    Score,
    Comment,
    Submit,
}

impl RatingStep {
    const fn as_str(self) -> &'static str {
        match self {
            Self::SelectOrder => "select_order",
            Self::Score => "score",
            Self::Comment => "comment",
            Self::Submit => "submit",
        }
    }

    const fn id(self) -> StepId {
        StepId::from_static(self.as_str())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct RatingData {
    phone: Option<String>,
    rating_order_number: Option<String>,
    rating_score: Option<u8>,
    rating_comment: Option<String>,
    list_message_id: Option<String>,
}

impl RatingData {
    fn from_state(state: &DialogState) -> Result<Self, WorkflowError> {
        state.data().extract()
    }
}

pub(super) fn workflow(
    services: &WorkflowServices,
    items_per_page: usize,
) -> Result<Workflow, WorkflowError> {
    Workflow::builder(RATING, RatingStep::SelectOrder.id())
        .with_name("Rate an order")
        .with_step(SelectOrderStep {
            services: services.clone(),
            items_per_page,
        })
        .with_step(ScoreStep {
            services: services.clone(),
        })
        .with_step(CommentStep {
            services: services.clone(),
        })
        .with_step(SubmitStep {
            services: services.clone(),
        })
        .build()
}

#[derive(Debug)]
struct SelectOrderStep {
    services: WorkflowServices,
    items_per_page: usize,
}

impl SelectOrderStep {
    const PROMPT: &'static str = "Which order would you like to rate?";

    fn button(order: &Order) -> Button {
        Button::new(
            format!("{} ({})", order.title, order.number),
            CallbackData::select(order.number.clone()),
        )
    }

    fn rows(orders: &[Order], pagination: &PaginationState) -> Vec<ButtonRow> {
        let mut rows = pagination.grid(orders, Self::button);
        rows.push(vec![Button::new("Back to menu", CallbackData::back())]);
        rows
    }

    async fn orders(&self, phone: &str) -> Result<Vec<Order>, WorkflowError> {
        Ok(self.services.accounts.list_orders(phone).await?)
    }
}

#[async_trait]
impl Step for SelectOrderStep {
    fn id(&self) -> StepId {
        RatingStep::SelectOrder.id()
    }

    fn transitions(&self) -> Vec<StepId> {
        vec![RatingStep::Score.id()]
    }

    fn chains_to(&self) -> Vec<WorkflowId> {
        vec![MENU, ONBOARDING]
    }

    async fn enter(&self, state: &DialogState) -> StepResult {
        let chat = state.chat();

        let Some(account) = linked_account(&self.services, state).await? else {
            return Ok(StepOutcome::chain_to(&ONBOARDING));
        };

        let orders = self.orders(&account.phone).await?;
        if orders.is_empty() {
            self.services
                .messenger
                .send_text(&chat, "You have no orders to rate yet.")
                .await?;
            return Ok(StepOutcome::chain_to(&MENU));
        }

        let pagination = PaginationState::new(orders.len(), self.items_per_page);
        let rows = Self::rows(&orders, &pagination);
        let message_id =
            show_grid(self.services.messenger.as_ref(), &chat, Self::PROMPT, &rows, None).await?;

        let update = RatingData {
            phone: Some(account.phone),
            list_message_id: message_id,
            ..Default::default()
        };
        StepOutcome::stay()
            .with_pagination(pagination)
            .with_typed(&update)
    }

    async fn handle_input(&self, state: &DialogState, input: &UserInput) -> StepResult {
        let chat = state.chat();
        let data = RatingData::from_state(state)?;
        let phone = data.phone.ok_or_else(|| {
            WorkflowError::step_failed(RatingStep::SelectOrder.as_str(), "phone missing from state")
        })?;

        match ListAction::from_input(input) {
            ListAction::Page(page) => {
                let orders = self.orders(&phone).await?;
                let pagination =
                    PaginationState::new(orders.len(), self.items_per_page).with_page(page);
                let rows = Self::rows(&orders, &pagination);
                debug!(page = pagination.current_page, "Order list page turned");

                let message_id = show_grid(
                    self.services.messenger.as_ref(),
                    &chat,
                    Self::PROMPT,
                    &rows,
                    data.list_message_id.as_deref(),
                )
                .await?;

                let mut outcome = StepOutcome::stay().with_pagination(pagination);
                if let Some(id) = message_id {
                    outcome = outcome.with_update(LIST_MESSAGE_KEY, id);
                }
                Ok(outcome)
            }
            ListAction::Select(number) => {
                let orders = self.orders(&phone).await?;
                if orders.iter().any(|order| order.number == number) {
                    Ok(StepOutcome::go_to(RatingStep::Score.id()).with_update(ORDER_KEY, number))
                } else {
                    self.services
                        .messenger
                        .send_text(&chat, "That order is not on your list.")
                        .await?;
                    Ok(StepOutcome::stay())
                }
            }
            ListAction::Back => Ok(StepOutcome::chain_to(&MENU)),
            ListAction::Ignore => Ok(StepOutcome::stay()),
            ListAction::Unrecognized => {
                self.services
                    .messenger
                    .send_text(&chat, "Please pick an order from the list.")
                    .await?;
                Ok(StepOutcome::stay())
            }
        }
    }
}

#[derive(Debug)]
struct ScoreStep {
    services: WorkflowServices,
}

impl ScoreStep {
    fn score(input: &UserInput) -> Option<u8> {
        let raw = match input.callback_data() {
            Some(data) => data.selected_id().map(str::to_string),
            None => typed_text(input).map(str::to_string),
        }?;

        raw.parse::<u8>()
            .ok()
            .filter(|score| (MIN_SCORE..=MAX_SCORE).contains(score))
    }
}

#[async_trait]
impl Step for ScoreStep {
    fn id(&self) -> StepId {
        RatingStep::Score.id()
    }

    fn transitions(&self) -> Vec<StepId> {
        vec![RatingStep::Comment.id()]
    }

    async fn enter(&self, state: &DialogState) -> StepResult {
        let order = state.data().get_str(ORDER_KEY).unwrap_or_default();
        let buttons: Vec<Button> = (MIN_SCORE..=MAX_SCORE)
            .map(|score| Button::new(score.to_string(), CallbackData::select(score.to_string())))
            .collect();

        self.services
            .messenger
            .send_inline_options(
                &state.chat(),
                &format!("How would you rate order {}?", order),
                &buttons,
            )
            .await?;
        Ok(StepOutcome::stay())
    }

    async fn handle_input(&self, state: &DialogState, input: &UserInput) -> StepResult {
        match Self::score(input) {
            Some(score) => {
                Ok(StepOutcome::go_to(RatingStep::Comment.id()).with_update(SCORE_KEY, score))
            }
            None => {
                self.services
                    .messenger
                    .send_text(
                        &state.chat(),
                        &format!("Please choose a score from {} to {}.", MIN_SCORE, MAX_SCORE),
                    )
                    .await?;
                Ok(StepOutcome::stay())
            }
        }
    }
}

#[derive(Debug)]
struct CommentStep {
    services: WorkflowServices,
}

#[async_trait]
impl Step for CommentStep {
    fn id(&self) -> StepId {
        RatingStep::Comment.id()
    }

    fn transitions(&self) -> Vec<StepId> {
        vec![RatingStep::Submit.id()]
    }

    async fn enter(&self, state: &DialogState) -> StepResult {
        self.services
            .messenger
            .send_inline_options(
                &state.chat(),
                "Anything to add? Type a comment or skip.",
                &[Button::new("Skip", CallbackData::confirm())],
            )
            .await?;
        Ok(StepOutcome::stay())
    }

    async fn handle_input(&self, state: &DialogState, input: &UserInput) -> StepResult {
        if input.callback_data().is_some_and(|data| data.is_confirm()) {
            return Ok(StepOutcome::go_to(RatingStep::Submit.id()));
        }

        match typed_text(input) {
            Some(comment) => {
                let comment: String = comment.chars().take(MAX_COMMENT_CHARS).collect();
                Ok(StepOutcome::go_to(RatingStep::Submit.id()).with_update(COMMENT_KEY, comment))
            }
            None => {
                self.services
                    .messenger
                    .send_text(&state.chat(), "Type a comment, or press Skip.")
                    .await?;
                Ok(StepOutcome::stay())
            }
        }
    }
}

#[derive(Debug)]
struct SubmitStep {
    services: WorkflowServices,
}

#[async_trait]
impl Step for SubmitStep {
    fn id(&self) -> StepId {
        RatingStep::Submit.id()
    }

    fn chains_to(&self) -> Vec<WorkflowId> {
        vec![MENU]
    }

    async fn enter(&self, state: &DialogState) -> StepResult {
        let chat = state.chat();
        let data = RatingData::from_state(state)?;
        let (Some(phone), Some(order), Some(score)) =
            (data.phone, data.rating_order_number, data.rating_score)
        else {
            return Err(WorkflowError::step_failed(
                RatingStep::Submit.as_str(),
                "order and score must be chosen before submitting",
            ));
        };

        let rating = Rating::new(order, score)?.with_comment(data.rating_comment);
        let order_number = rating.order_number.clone();

        if let Err(e) = self.services.accounts.submit_rating(&phone, rating).await {
            self.services
                .messenger
                .send_text(&chat, "Sorry, we couldn't save your rating. Please try again later.")
                .await?;
            return Err(e.into());
        }

        info!(order = %order_number, score, "Rating submitted");
        self.services
            .messenger
            .send_text(&chat, "Thanks for your feedback!")
            .await?;

        Ok(StepOutcome::chain_to(&MENU))
    }

    async fn handle_input(&self, state: &DialogState, _input: &UserInput) -> StepResult {
        self.enter(state).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::account::MockAccountService;
    use crate::domain::messenger::mock::{RecordingMessenger, SentMessage};
    use crate::domain::state::{StateData, StateKey};
    use crate::domain::DomainError;
    use crate::infrastructure::account::InMemoryAccountService;
    use crate::workflows::harness::Harness;
    use crate::workflows::menu::RATE_LABEL;

    #[tokio::test]
    async fn test_full_rating_flow() {
        let h = Harness::new();
        h.register("Ann").await;

        h.say(RATE_LABEL).await;
        let state = h.state().await.unwrap();
        assert_eq!(state.workflow_id().as_str(), "rating");
        assert_eq!(state.current_step().as_str(), "select_order");
        assert_eq!(state.pagination().map(|p| p.total_pages), Some(3));
        assert_eq!(state.data().get_str("phone"), Some("+15550102030"));
        assert!(state.data().get_str(LIST_MESSAGE_KEY).is_some());

        h.press("wf:page:3").await;
        let Some(SentMessage::EditGrid { rows, .. }) = h.messenger.last() else {
            panic!("expected edited order grid");
        };
        // two orders, navigation row, back row
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][0].text, "Order #11 (A-011)");

        h.press("wf:select:A-011").await;
        assert_eq!(
            h.position().await.map(|(_, step)| step),
            Some("score".to_string())
        );

        h.say("9").await;
        assert_eq!(
            h.position().await.map(|(_, step)| step),
            Some("score".to_string())
        );

        h.press("wf:select:4").await;
        h.say("Arrived on time").await;

        assert_eq!(
            h.position().await,
            Some(("menu".to_string(), "main".to_string()))
        );
        let ratings = h.accounts.ratings().unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].0, "+15550102030");
        assert_eq!(ratings[0].1.order_number, "A-011");
        assert_eq!(ratings[0].1.score, 4);
        assert_eq!(ratings[0].1.comment.as_deref(), Some("Arrived on time"));
    }

    #[tokio::test]
    async fn test_skip_comment_and_typed_score() {
        let h = Harness::new();
        h.register("Ann").await;
        h.say(RATE_LABEL).await;
        h.press("wf:select:A-001").await;

        h.say("5").await;
        h.press("wf:confirm").await;

        let ratings = h.accounts.ratings().unwrap();
        assert_eq!(ratings[0].1.score, 5);
        assert_eq!(ratings[0].1.comment, None);
        assert!(h.messenger.texts().contains(&"Thanks for your feedback!".to_string()));
    }

    #[tokio::test]
    async fn test_back_returns_to_menu() {
        let h = Harness::new();
        h.register("Ann").await;
        h.say(RATE_LABEL).await;

        h.press("wf:back").await;

        assert_eq!(
            h.position().await,
            Some(("menu".to_string(), "main".to_string()))
        );
    }

    #[tokio::test]
    async fn test_no_orders_chains_back_to_menu() {
        let accounts = InMemoryAccountService::new().with_orders("+15550102030", Vec::new());
        let h = Harness::with_accounts(accounts);
        h.register("Ann").await;

        h.say(RATE_LABEL).await;

        assert_eq!(
            h.position().await,
            Some(("menu".to_string(), "main".to_string()))
        );
        assert!(h
            .messenger
            .texts()
            .contains(&"You have no orders to rate yet.".to_string()));
    }

    #[tokio::test]
    async fn test_submit_without_score_is_a_step_error() {
        let h = Harness::new();
        let step = SubmitStep {
            services: crate::workflows::WorkflowServices::new(
                h.messenger.clone(),
                h.accounts.clone(),
            ),
        };
        let state = DialogState::new(
            &h.chat,
            RATING,
            RatingStep::Submit.id(),
            Default::default(),
        );

        let err = step.enter(&state).await.unwrap_err();
        assert!(matches!(err, WorkflowError::StepFailed { .. }));
        assert!(h
            .engine
            .current_state(&StateKey::from(&h.chat))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_failed_submission_apologizes_and_errors() {
        let mut accounts = MockAccountService::new();
        accounts
            .expect_submit_rating()
            .withf(|phone, rating| phone == "+15550102030" && rating.score == 3)
            .times(1)
            .returning(|_, _| Err(DomainError::storage("connection reset")));

        let messenger = Arc::new(RecordingMessenger::new());
        let step = SubmitStep {
            services: crate::workflows::WorkflowServices::new(
                messenger.clone(),
                Arc::new(accounts),
            ),
        };

        let mut data = StateData::new();
        data.insert("phone", "+15550102030");
        data.insert(ORDER_KEY, "A-002");
        data.insert(SCORE_KEY, 3);
        let chat = crate::domain::messenger::ChatRef::direct("console", "42");
        let state = DialogState::new(&chat, RATING, RatingStep::Submit.id(), data);

        let err = step.enter(&state).await.unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Domain(DomainError::Storage { .. })
        ));
        assert_eq!(
            messenger.texts(),
            vec!["Sorry, we couldn't save your rating. Please try again later.".to_string()]
        );
    }
}

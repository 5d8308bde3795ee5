//! Step contract and step outcomes

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::error::WorkflowError;
use super::ids::{StepId, WorkflowId};
use crate::domain::input::UserInput;
use crate::domain::pagination::PaginationState;
use crate::domain::state::{DialogState, StateData, NEXT_WORKFLOW_KEY};

/// Instruction from a step to the engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    /// Step to move to; ignored when equal to the current step
    pub next_step: Option<StepId>,

    /// Shallow-merged into the state data, later writes win
    pub update_state: StateData,

    /// `Some(Some(_))` sets pagination, `Some(None)` clears it
    pub pagination: Option<Option<PaginationState>>,

    /// The workflow finished; chains when `next_workflow` is set
    pub complete: bool,
}

impl StepOutcome {
    /// Stay on the current step
    pub fn stay() -> Self {
        Self::default()
    }

    /// Transition to another step of the same workflow
    pub fn go_to(step: StepId) -> Self {
        Self {
            next_step: Some(step),
            ..Default::default()
        }
    }

    /// Finish the workflow; the user becomes idle
    pub fn complete() -> Self {
        Self {
            complete: true,
            ..Default::default()
        }
    }

    /// Finish the workflow and immediately start `workflow` for the same user
    pub fn chain_to(workflow: &WorkflowId) -> Self {
        Self::complete().with_update(NEXT_WORKFLOW_KEY, workflow.as_str())
    }

    pub fn with_update(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.update_state.insert(key, value);
        self
    }

    pub fn with_data(mut self, data: StateData) -> Self {
        self.update_state.merge(&data);
        self
    }

    /// Merge a typed state-extension struct into the update
    pub fn with_typed<T: Serialize>(self, value: &T) -> Result<Self, WorkflowError> {
        Ok(self.with_data(StateData::from_typed(value)?))
    }

    pub fn with_pagination(mut self, pagination: PaginationState) -> Self {
        self.pagination = Some(Some(pagination));
        self
    }

    pub fn clear_pagination(mut self) -> Self {
        self.pagination = Some(None);
        self
    }

    /// Requested transition target, if it differs from `current`
    pub fn transition_from(&self, current: &StepId) -> Option<&StepId> {
        self.next_step.as_ref().filter(|next| *next != current)
    }
}

/// Result of entering a step or handling input.
///
/// `Err` aborts the dispatch without persisting the merged state.
pub type StepResult = Result<StepOutcome, WorkflowError>;

/// One stage of a dialog
#[async_trait]
pub trait Step: Send + Sync + std::fmt::Debug {
    /// Identifier, unique within the owning workflow
    fn id(&self) -> StepId;

    /// Steps this step may transition to; checked at registration
    fn transitions(&self) -> Vec<StepId> {
        Vec::new()
    }

    /// Workflows this step may chain to; checked at registration
    fn chains_to(&self) -> Vec<WorkflowId> {
        Vec::new()
    }

    /// Called once when the user arrives at this step
    async fn enter(&self, state: &DialogState) -> StepResult;

    /// Called for every event while this step is current
    async fn handle_input(&self, state: &DialogState, input: &UserInput) -> StepResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_to_sets_next_workflow() {
        let outcome = StepOutcome::chain_to(&WorkflowId::from_static("menu"));
        assert!(outcome.complete);
        assert_eq!(outcome.update_state.get_str(NEXT_WORKFLOW_KEY), Some("menu"));
    }

    #[test]
    fn test_transition_from_ignores_self() {
        let current = StepId::from_static("ask_name");
        assert!(StepOutcome::go_to(current.clone())
            .transition_from(&current)
            .is_none());
        assert!(StepOutcome::stay().transition_from(&current).is_none());

        let next = StepId::from_static("finish");
        let outcome = StepOutcome::go_to(next.clone());
        assert_eq!(outcome.transition_from(&current), Some(&next));
    }

    #[test]
    fn test_pagination_tristate() {
        assert_eq!(StepOutcome::stay().pagination, None);
        assert_eq!(StepOutcome::stay().clear_pagination().pagination, Some(None));

        let page = PaginationState::new(10, 5);
        assert_eq!(
            StepOutcome::stay().with_pagination(page).pagination,
            Some(Some(page))
        );
    }
}

//! Dialog engine: load state, dispatch input, apply outcomes, persist

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use super::locks::{UserLockGuard, UserLocks};
use crate::domain::input::{is_workflow_token, DeepLinkData, InboundEvent, UserInput};
use crate::domain::messenger::{ChatRef, ChoiceResolver};
use crate::domain::state::{DialogState, StateData, StateKey, StateRepository, DEEP_LINK_KEY};
use crate::domain::workflow::{
    StepOutcome, StepResult, Workflow, WorkflowError, WorkflowId, WorkflowRegistry,
};

pub const DEFAULT_MAX_TRANSITIONS: usize = 20;

/// Configuration for the dialog engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Step transitions plus workflow chain hops allowed in one dispatch
    pub max_transitions: usize,

    /// Hold a per-user lock across load, mutate and save
    pub serialize_per_user: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_transitions: DEFAULT_MAX_TRANSITIONS,
            serialize_per_user: true,
        }
    }
}

impl EngineConfig {
    pub fn with_max_transitions(mut self, max_transitions: usize) -> Self {
        self.max_transitions = max_transitions;
        self
    }

    pub fn with_serialize_per_user(mut self, serialize: bool) -> Self {
        self.serialize_per_user = serialize;
        self
    }
}

/// Channel-agnostic orchestrator of workflows.
///
/// Every entry point runs one pipeline: load the user's state (starting the
/// default workflow when there is none), hand the normalized input to the
/// current step and apply the returned [`StepOutcome`]s until the dialog
/// settles on a step, completes, or hits the transition cap.
pub struct DialogEngine {
    registry: Arc<WorkflowRegistry>,
    store: Arc<dyn StateRepository>,
    resolver: Option<Arc<dyn ChoiceResolver>>,
    locks: UserLocks,
    config: EngineConfig,
}

impl std::fmt::Debug for DialogEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogEngine")
            .field("workflows", &self.registry.len())
            .field("resolver", &self.resolver.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl DialogEngine {
    pub fn new(registry: Arc<WorkflowRegistry>, store: Arc<dyn StateRepository>) -> Self {
        Self {
            registry,
            store,
            resolver: None,
            locks: UserLocks::new(),
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolver for numbered-menu replies on text-only channels
    pub fn with_choice_resolver(mut self, resolver: Arc<dyn ChoiceResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn registry(&self) -> &WorkflowRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Plain text message
    #[instrument(skip(self, chat, text), fields(platform = %chat.platform, user_id = %chat.user_id))]
    pub async fn handle_message(
        &self,
        chat: &ChatRef,
        text: &str,
        message_id: Option<String>,
    ) -> Result<(), WorkflowError> {
        self.dispatch(
            chat,
            InboundEvent::Message {
                text: text.to_string(),
                message_id,
            },
        )
        .await
    }

    /// Inline button press
    #[instrument(skip(self, chat), fields(platform = %chat.platform, user_id = %chat.user_id))]
    pub async fn handle_callback(
        &self,
        chat: &ChatRef,
        data: &str,
        message_id: Option<String>,
    ) -> Result<(), WorkflowError> {
        self.dispatch(
            chat,
            InboundEvent::Callback {
                data: data.to_string(),
                message_id,
            },
        )
        .await
    }

    /// Shared contact card
    #[instrument(skip(self, chat, phone), fields(platform = %chat.platform, user_id = %chat.user_id))]
    pub async fn handle_contact(&self, chat: &ChatRef, phone: &str) -> Result<(), WorkflowError> {
        self.dispatch(
            chat,
            InboundEvent::Contact {
                phone: phone.to_string(),
            },
        )
        .await
    }

    /// Any already-built channel event
    pub async fn handle_event(
        &self,
        chat: &ChatRef,
        event: InboundEvent,
    ) -> Result<(), WorkflowError> {
        self.dispatch(chat, event).await
    }

    /// Start command: drop any active dialog and start the default workflow,
    /// seeding the parsed deep link when one is given
    #[instrument(skip(self, chat), fields(platform = %chat.platform, user_id = %chat.user_id))]
    pub async fn handle_start(
        &self,
        chat: &ChatRef,
        param: Option<&str>,
    ) -> Result<(), WorkflowError> {
        let key = StateKey::from(chat);
        let _guard = self.lock(&key).await;

        let mut seed = StateData::new();
        if let Some(link) = param.and_then(DeepLinkData::parse) {
            debug!(kind = %link.kind, code = %link.code, "Deep link parsed");
            let value = serde_json::to_value(&link)
                .map_err(|e| WorkflowError::state_data(e.to_string()))?;
            seed.insert(DEEP_LINK_KEY, value);
        }

        if self.store.delete(&key).await? {
            info!("Active dialog replaced by start command");
        }

        let workflow = self.registry.default_workflow().clone();
        self.start(chat, workflow, seed).await
    }

    /// Start `workflow_id` for the user, replacing any active dialog
    #[instrument(skip(self, chat, seed), fields(platform = %chat.platform, user_id = %chat.user_id))]
    pub async fn start_workflow(
        &self,
        chat: &ChatRef,
        workflow_id: &WorkflowId,
        seed: StateData,
    ) -> Result<(), WorkflowError> {
        let key = StateKey::from(chat);
        let _guard = self.lock(&key).await;

        let workflow = self
            .registry
            .workflow(workflow_id)
            .inspect_err(|e| error!(error = %e, "Cannot start workflow"))?
            .clone();

        self.start(chat, workflow, seed).await
    }

    /// Operator clear: the user becomes idle. Returns whether a row existed.
    #[instrument(skip(self))]
    pub async fn reset(&self, key: &StateKey) -> Result<bool, WorkflowError> {
        let _guard = self.lock(key).await;
        let deleted = self.store.delete(key).await?;
        info!(deleted, "Dialog state cleared");
        Ok(deleted)
    }

    /// Persisted state of a user, `None` when idle
    pub async fn current_state(&self, key: &StateKey) -> Result<Option<DialogState>, WorkflowError> {
        Ok(self.store.load(key).await?)
    }

    async fn lock(&self, key: &StateKey) -> Option<UserLockGuard<'_>> {
        if self.config.serialize_per_user {
            Some(self.locks.acquire(key).await)
        } else {
            None
        }
    }

    async fn dispatch(&self, chat: &ChatRef, event: InboundEvent) -> Result<(), WorkflowError> {
        let key = StateKey::from(chat);
        let _guard = self.lock(&key).await;

        let Some(mut state) = self.store.load(&key).await? else {
            if matches!(event, InboundEvent::Callback { .. }) {
                warn!("Stale button press without an active dialog");
            }
            info!(event = event.kind(), "No active dialog, starting default workflow");
            let workflow = self.registry.default_workflow().clone();
            return self.start(chat, workflow, StateData::new()).await;
        };

        let workflow = self
            .registry
            .workflow(state.workflow_id())
            .inspect_err(|e| lookup_failure(&state, e))?
            .clone();
        let step = workflow
            .step(state.current_step())
            .inspect_err(|e| lookup_failure(&state, e))?
            .clone();

        if state.chat_id() != chat.chat_id {
            state.set_chat_id(chat.chat_id.clone());
        }

        let input = self.normalize(chat, event).await;
        debug!(
            workflow = %state.workflow_id(),
            step = %state.current_step(),
            "Dispatching input"
        );

        let result = step.handle_input(&state, &input).await;
        self.process(state, workflow, result).await
    }

    async fn normalize(&self, chat: &ChatRef, event: InboundEvent) -> UserInput {
        let resolved = match (&event, &self.resolver) {
            (InboundEvent::Message { text, .. }, Some(resolver)) => {
                resolver.resolve(chat, text).await
            }
            (InboundEvent::Callback { data, .. }, _) if !is_workflow_token(data) => {
                warn!(token = %data, "Callback token was not issued by a workflow");
                None
            }
            _ => None,
        };

        if let Some(choice) = &resolved {
            debug!(label = %choice.label, "Numbered reply resolved to choice");
        }

        event.normalize(resolved)
    }

    /// Persist a fresh state at the initial step, then enter it
    async fn start(
        &self,
        chat: &ChatRef,
        workflow: Arc<Workflow>,
        seed: StateData,
    ) -> Result<(), WorkflowError> {
        let state = DialogState::new(
            chat,
            workflow.id().clone(),
            workflow.initial_step().clone(),
            seed,
        );
        self.store.save(&state).await?;
        info!(workflow = %workflow.id(), step = %state.current_step(), "Workflow started");

        let step = workflow.step(state.current_step())?.clone();
        let result = step.enter(&state).await;
        self.process(state, workflow, result).await
    }

    /// Apply outcomes until the dialog settles.
    ///
    /// Iterative so chained workflows and auto-transitions share one
    /// `max_transitions` budget.
    async fn process(
        &self,
        mut state: DialogState,
        mut workflow: Arc<Workflow>,
        mut result: StepResult,
    ) -> Result<(), WorkflowError> {
        let mut hops = 0usize;

        loop {
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(
                        workflow = %state.workflow_id(),
                        step = %state.current_step(),
                        error = %err,
                        "Step failed, state not persisted"
                    );
                    return Err(err);
                }
            };

            apply(&mut state, &outcome);

            if outcome.complete {
                let Some(next_id) = state.next_workflow().map(str::to_owned) else {
                    self.store.delete(&state.key()).await?;
                    info!(workflow = %state.workflow_id(), "Workflow completed");
                    return Ok(());
                };

                let next = self
                    .registry
                    .get_str(&next_id)
                    .cloned()
                    .ok_or_else(|| WorkflowError::workflow_not_found(next_id.as_str()))
                    .inspect_err(|e| lookup_failure(&state, e))?;

                if hops >= self.config.max_transitions {
                    return self.transition_limit(&state).await;
                }
                hops += 1;

                self.store.delete(&state.key()).await?;
                info!(from = %state.workflow_id(), to = %next.id(), "Chaining workflow");

                state = DialogState::new(
                    &state.chat(),
                    next.id().clone(),
                    next.initial_step().clone(),
                    StateData::new(),
                );
                self.store.save(&state).await?;
                workflow = next;

                let step = workflow.step(state.current_step())?.clone();
                result = step.enter(&state).await;
                continue;
            }

            let Some(next_step) = outcome.transition_from(state.current_step()).cloned() else {
                break;
            };

            if hops >= self.config.max_transitions {
                return self.transition_limit(&state).await;
            }
            hops += 1;

            let step = workflow
                .step(&next_step)
                .inspect_err(|e| lookup_failure(&state, e))?
                .clone();

            debug!(
                workflow = %state.workflow_id(),
                from = %state.current_step(),
                to = %next_step,
                "Step transition"
            );

            state.move_to(next_step);
            state.touch();
            self.store.save(&state).await?;

            result = step.enter(&state).await;
        }

        self.store.save(&state).await?;
        Ok(())
    }

    async fn transition_limit(&self, state: &DialogState) -> Result<(), WorkflowError> {
        error!(
            workflow = %state.workflow_id(),
            step = %state.current_step(),
            limit = self.config.max_transitions,
            "Transition limit reached, check the workflow for a cycle"
        );
        self.store.save(state).await?;

        Err(WorkflowError::TransitionLimitExceeded {
            workflow: state.workflow_id().to_string(),
            step: state.current_step().to_string(),
            limit: self.config.max_transitions,
        })
    }
}

fn apply(state: &mut DialogState, outcome: &StepOutcome) {
    state.merge_data(&outcome.update_state);
    if let Some(pagination) = outcome.pagination {
        state.set_pagination(pagination);
    }
    state.touch();
}

fn lookup_failure(state: &DialogState, err: &WorkflowError) {
    error!(
        platform = %state.platform(),
        user_id = %state.user_id(),
        workflow = %state.workflow_id(),
        step = %state.current_step(),
        error = %err,
        "Workflow lookup failed"
    );
}

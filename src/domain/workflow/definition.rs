//! Workflow definition: a fixed registry of steps plus an initial step

use std::collections::HashMap;
use std::sync::Arc;

use super::error::WorkflowError;
use super::ids::{StepId, WorkflowId};
use super::step::Step;

/// Immutable workflow built once at process start
#[derive(Debug, Clone)]
pub struct Workflow {
    id: WorkflowId,
    name: String,
    initial_step: StepId,
    steps: HashMap<StepId, Arc<dyn Step>>,
    order: Vec<StepId>,
}

impl Workflow {
    /// Start building a workflow
    pub fn builder(id: WorkflowId, initial_step: StepId) -> WorkflowBuilder {
        WorkflowBuilder {
            name: id.to_string(),
            id,
            initial_step,
            steps: Vec::new(),
        }
    }

    pub fn id(&self) -> &WorkflowId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial_step(&self) -> &StepId {
        &self.initial_step
    }

    pub fn get_step(&self, id: &StepId) -> Option<&Arc<dyn Step>> {
        self.steps.get(id)
    }

    /// Lookup that treats a miss as a programmer error
    pub fn step(&self, id: &StepId) -> Result<&Arc<dyn Step>, WorkflowError> {
        self.get_step(id)
            .ok_or_else(|| WorkflowError::step_not_found(self.id.as_str(), id.as_str()))
    }

    /// Step ids in registration order
    pub fn step_ids(&self) -> &[StepId] {
        &self.order
    }

    /// Every workflow a step of this workflow declares it may chain to
    pub fn chain_targets(&self) -> Vec<WorkflowId> {
        let mut targets: Vec<WorkflowId> = self
            .order
            .iter()
            .filter_map(|id| self.steps.get(id))
            .flat_map(|step| step.chains_to())
            .collect();
        targets.sort();
        targets.dedup();
        targets
    }
}

/// Builder that validates the step graph before producing a [`Workflow`]
#[derive(Debug)]
pub struct WorkflowBuilder {
    id: WorkflowId,
    name: String,
    initial_step: StepId,
    steps: Vec<Arc<dyn Step>>,
}

impl WorkflowBuilder {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_step(self, step: impl Step + 'static) -> Self {
        self.with_shared_step(Arc::new(step))
    }

    pub fn with_shared_step(mut self, step: Arc<dyn Step>) -> Self {
        self.steps.push(step);
        self
    }

    /// Validate ids, duplicates, the initial step and every declared transition
    pub fn build(self) -> Result<Workflow, WorkflowError> {
        self.id.validate()?;
        self.initial_step.validate()?;

        let mut steps: HashMap<StepId, Arc<dyn Step>> = HashMap::with_capacity(self.steps.len());
        let mut order = Vec::with_capacity(self.steps.len());

        for step in self.steps {
            let step_id = step.id();
            step_id.validate()?;

            if steps.contains_key(&step_id) {
                return Err(WorkflowError::definition(format!(
                    "Workflow '{}' registers step '{}' twice",
                    self.id, step_id
                )));
            }

            order.push(step_id.clone());
            steps.insert(step_id, step);
        }

        if !steps.contains_key(&self.initial_step) {
            return Err(WorkflowError::definition(format!(
                "Workflow '{}' initial step '{}' is not registered",
                self.id, self.initial_step
            )));
        }

        for step_id in &order {
            let step = &steps[step_id];
            for target in step.transitions() {
                if !steps.contains_key(&target) {
                    return Err(WorkflowError::definition(format!(
                        "Step '{}' of workflow '{}' transitions to unknown step '{}'",
                        step_id, self.id, target
                    )));
                }
            }
            for workflow in step.chains_to() {
                workflow.validate()?;
            }
        }

        Ok(Workflow {
            id: self.id,
            name: self.name,
            initial_step: self.initial_step,
            steps,
            order,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted steps shared by workflow, registry and engine tests

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::super::step::{Step, StepOutcome, StepResult};
    use super::super::{StepId, WorkflowId};
    use crate::domain::input::UserInput;
    use crate::domain::state::DialogState;

    type Script = Arc<dyn Fn(&DialogState, Option<&UserInput>) -> StepResult + Send + Sync>;

    /// Step whose behavior is a closure; counts enter and input calls
    #[derive(Clone)]
    pub struct ScriptedStep {
        id: StepId,
        transitions: Vec<StepId>,
        chains: Vec<WorkflowId>,
        on_enter: Script,
        on_input: Script,
        pub enters: Arc<AtomicUsize>,
        pub inputs: Arc<AtomicUsize>,
    }

    impl std::fmt::Debug for ScriptedStep {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ScriptedStep").field("id", &self.id).finish()
        }
    }

    impl ScriptedStep {
        pub fn new(id: &'static str) -> Self {
            Self {
                id: StepId::from_static(id),
                transitions: Vec::new(),
                chains: Vec::new(),
                on_enter: Arc::new(|_: &DialogState, _: Option<&UserInput>| {
                    Ok(StepOutcome::stay())
                }),
                on_input: Arc::new(|_: &DialogState, _: Option<&UserInput>| {
                    Ok(StepOutcome::stay())
                }),
                enters: Arc::new(AtomicUsize::new(0)),
                inputs: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn on_enter(
            mut self,
            script: impl Fn(&DialogState) -> StepResult + Send + Sync + 'static,
        ) -> Self {
            self.on_enter =
                Arc::new(move |state: &DialogState, _: Option<&UserInput>| script(state));
            self
        }

        pub fn on_input(
            mut self,
            script: impl Fn(&DialogState, &UserInput) -> StepResult + Send + Sync + 'static,
        ) -> Self {
            self.on_input = Arc::new(move |state: &DialogState, input: Option<&UserInput>| match input {
                Some(input) => script(state, input),
                None => Ok(StepOutcome::stay()),
            });
            self
        }

        pub fn transitions_to(mut self, step: &'static str) -> Self {
            self.transitions.push(StepId::from_static(step));
            self
        }

        pub fn chains_to_workflow(mut self, workflow: &'static str) -> Self {
            self.chains.push(WorkflowId::from_static(workflow));
            self
        }

        pub fn enter_count(&self) -> usize {
            self.enters.load(Ordering::SeqCst)
        }

        pub fn input_count(&self) -> usize {
            self.inputs.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Step for ScriptedStep {
        fn id(&self) -> StepId {
            self.id.clone()
        }

        fn transitions(&self) -> Vec<StepId> {
            self.transitions.clone()
        }

        fn chains_to(&self) -> Vec<WorkflowId> {
            self.chains.clone()
        }

        async fn enter(&self, state: &DialogState) -> StepResult {
            self.enters.fetch_add(1, Ordering::SeqCst);
            (self.on_enter)(state, None)
        }

        async fn handle_input(&self, state: &DialogState, input: &UserInput) -> StepResult {
            self.inputs.fetch_add(1, Ordering::SeqCst);
            (self.on_input)(state, Some(input))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedStep;
    use super::*;

    fn id(s: &'static str) -> StepId {
        StepId::from_static(s)
    }

    #[test]
    fn test_build_valid_workflow() {
        let workflow = Workflow::builder(WorkflowId::from_static("rating"), id("select"))
            .with_name("Order rating")
            .with_step(ScriptedStep::new("select").transitions_to("score"))
            .with_step(ScriptedStep::new("score").chains_to_workflow("menu"))
            .build()
            .unwrap();

        assert_eq!(workflow.name(), "Order rating");
        assert_eq!(workflow.initial_step(), &id("select"));
        assert_eq!(workflow.step_ids(), &[id("select"), id("score")]);
        assert!(workflow.get_step(&id("score")).is_some());
        assert_eq!(workflow.chain_targets(), vec![WorkflowId::from_static("menu")]);
    }

    #[test]
    fn test_missing_step_lookup_fails() {
        let workflow = Workflow::builder(WorkflowId::from_static("menu"), id("main"))
            .with_step(ScriptedStep::new("main"))
            .build()
            .unwrap();

        let err = workflow.step(&id("ghost")).unwrap_err();
        assert!(err.is_lookup_failure());
        assert!(workflow.get_step(&id("ghost")).is_none());
    }

    #[test]
    fn test_rejects_unregistered_initial_step() {
        let err = Workflow::builder(WorkflowId::from_static("menu"), id("main"))
            .with_step(ScriptedStep::new("other"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("initial step 'main'"));
    }

    #[test]
    fn test_rejects_unknown_transition_target() {
        let err = Workflow::builder(WorkflowId::from_static("menu"), id("main"))
            .with_step(ScriptedStep::new("main").transitions_to("typo"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("unknown step 'typo'"));
    }

    #[test]
    fn test_rejects_duplicate_steps() {
        let err = Workflow::builder(WorkflowId::from_static("menu"), id("main"))
            .with_step(ScriptedStep::new("main"))
            .with_step(ScriptedStep::new("main"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_rejects_invalid_static_ids() {
        let err = Workflow::builder(WorkflowId::from_static("Menu"), id("main"))
            .with_step(ScriptedStep::new("main"))
            .build()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidId(_)));
    }
}

//! Immutable workflow registry built at process start

use std::collections::HashMap;
use std::sync::Arc;

use super::definition::Workflow;
use super::error::WorkflowError;
use super::ids::WorkflowId;

/// Read-only set of workflows plus the default started for idle users
#[derive(Debug, Clone)]
pub struct WorkflowRegistry {
    workflows: HashMap<WorkflowId, Arc<Workflow>>,
    order: Vec<WorkflowId>,
    default_workflow: WorkflowId,
}

impl WorkflowRegistry {
    pub fn builder(default_workflow: WorkflowId) -> WorkflowRegistryBuilder {
        WorkflowRegistryBuilder {
            default_workflow,
            workflows: Vec::new(),
        }
    }

    pub fn get(&self, id: &WorkflowId) -> Option<&Arc<Workflow>> {
        self.workflows.get(id)
    }

    /// Lookup by raw id as stored in state data
    pub fn get_str(&self, id: &str) -> Option<&Arc<Workflow>> {
        self.workflows.get(&WorkflowId::new(id).ok()?)
    }

    /// Lookup that treats a miss as a programmer error
    pub fn workflow(&self, id: &WorkflowId) -> Result<&Arc<Workflow>, WorkflowError> {
        self.get(id)
            .ok_or_else(|| WorkflowError::workflow_not_found(id.as_str()))
    }

    pub fn default_workflow(&self) -> &Arc<Workflow> {
        &self.workflows[&self.default_workflow]
    }

    pub fn default_workflow_id(&self) -> &WorkflowId {
        &self.default_workflow
    }

    /// Workflows in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Workflow>> {
        self.order.iter().filter_map(|id| self.workflows.get(id))
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

/// Collects workflows and validates cross-workflow references
#[derive(Debug)]
pub struct WorkflowRegistryBuilder {
    default_workflow: WorkflowId,
    workflows: Vec<Workflow>,
}

impl WorkflowRegistryBuilder {
    pub fn with_workflow(mut self, workflow: Workflow) -> Self {
        self.workflows.push(workflow);
        self
    }

    /// Reject duplicates, unknown chain targets and a missing default
    pub fn build(self) -> Result<WorkflowRegistry, WorkflowError> {
        let mut workflows = HashMap::with_capacity(self.workflows.len());
        let mut order = Vec::with_capacity(self.workflows.len());

        for workflow in self.workflows {
            let id = workflow.id().clone();
            if workflows.contains_key(&id) {
                return Err(WorkflowError::definition(format!(
                    "Workflow '{}' is registered twice",
                    id
                )));
            }
            order.push(id.clone());
            workflows.insert(id, Arc::new(workflow));
        }

        for id in &order {
            for target in workflows[id].chain_targets() {
                if !workflows.contains_key(&target) {
                    return Err(WorkflowError::definition(format!(
                        "Workflow '{}' chains to unknown workflow '{}'",
                        id, target
                    )));
                }
            }
        }

        if !workflows.contains_key(&self.default_workflow) {
            return Err(WorkflowError::definition(format!(
                "Default workflow '{}' is not registered",
                self.default_workflow
            )));
        }

        Ok(WorkflowRegistry {
            workflows,
            order,
            default_workflow: self.default_workflow,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::definition::testing::ScriptedStep;
    use super::super::Step;
    use super::*;

    fn workflow(id: &'static str, step: ScriptedStep) -> Workflow {
        let initial = step.id();
        Workflow::builder(WorkflowId::from_static(id), initial)
            .with_step(step)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_and_lookup() {
        let registry = WorkflowRegistry::builder(WorkflowId::from_static("onboarding"))
            .with_workflow(workflow(
                "onboarding",
                ScriptedStep::new("welcome").chains_to_workflow("menu"),
            ))
            .with_workflow(workflow("menu", ScriptedStep::new("main")))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.default_workflow().id().as_str(), "onboarding");
        assert!(registry.get_str("menu").is_some());
        assert!(registry.get_str("Not Valid").is_none());
        assert!(registry
            .workflow(&WorkflowId::from_static("rating"))
            .unwrap_err()
            .is_lookup_failure());

        let ids: Vec<&str> = registry.iter().map(|w| w.id().as_str()).collect();
        assert_eq!(ids, vec!["onboarding", "menu"]);
    }

    #[test]
    fn test_rejects_unknown_chain_target() {
        let err = WorkflowRegistry::builder(WorkflowId::from_static("onboarding"))
            .with_workflow(workflow(
                "onboarding",
                ScriptedStep::new("welcome").chains_to_workflow("menu"),
            ))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("unknown workflow 'menu'"));
    }

    #[test]
    fn test_rejects_missing_default() {
        let err = WorkflowRegistry::builder(WorkflowId::from_static("onboarding"))
            .with_workflow(workflow("menu", ScriptedStep::new("main")))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Default workflow"));
    }

    #[test]
    fn test_rejects_duplicate_workflow() {
        let err = WorkflowRegistry::builder(WorkflowId::from_static("menu"))
            .with_workflow(workflow("menu", ScriptedStep::new("main")))
            .with_workflow(workflow("menu", ScriptedStep::new("main")))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("twice"));
    }
}

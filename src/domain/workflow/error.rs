//! Workflow error types

use thiserror::Error;

use crate::domain::DomainError;

/// Errors that can occur while defining or dispatching workflows
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    #[error("Step '{step}' not found in workflow '{workflow}'")]
    StepNotFound { workflow: String, step: String },

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Invalid workflow definition: {0}")]
    Definition(String),

    #[error("Step '{step}' failed: {message}")]
    StepFailed { step: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transition limit of {limit} exceeded in workflow '{workflow}' at step '{step}'")]
    TransitionLimitExceeded {
        workflow: String,
        step: String,
        limit: usize,
    },

    #[error("State data error: {0}")]
    StateData(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl WorkflowError {
    pub fn workflow_not_found(id: impl Into<String>) -> Self {
        Self::WorkflowNotFound(id.into())
    }

    pub fn step_not_found(workflow: impl Into<String>, step: impl Into<String>) -> Self {
        Self::StepNotFound {
            workflow: workflow.into(),
            step: step.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId(message.into())
    }

    pub fn definition(message: impl Into<String>) -> Self {
        Self::Definition(message.into())
    }

    pub fn step_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StepFailed {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn state_data(message: impl Into<String>) -> Self {
        Self::StateData(message.into())
    }

    /// Lookup failures are programmer errors and are never shown to the user
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, Self::WorkflowNotFound(_) | Self::StepNotFound { .. })
    }
}

//! Workflow domain module
//!
//! A workflow is a fixed set of [`Step`]s plus an initial step. Steps react
//! to arriving (`enter`) and to normalized input (`handle_input`) and answer
//! with a [`StepOutcome`] telling the engine whether to stay, move, complete
//! or chain into another workflow.
//!
//! ## Registration-time checks
//!
//! Identifiers are validated, and every transition target a step declares
//! through [`Step::transitions`] (and every chain target declared through
//! [`Step::chains_to`]) must be registered, so a typo fails at startup
//! instead of at the first user hit.

mod definition;
mod error;
mod ids;
mod registry;
mod step;

pub use definition::{Workflow, WorkflowBuilder};
pub use error::WorkflowError;
pub use ids::{validate_identifier, StepId, WorkflowId, MAX_ID_LENGTH};
pub use registry::{WorkflowRegistry, WorkflowRegistryBuilder};
pub use step::{Step, StepOutcome, StepResult};

#[cfg(test)]
pub(crate) use definition::testing;

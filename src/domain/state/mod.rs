//! State domain - persisted position of a user inside a workflow

mod entity;
mod repository;

pub use entity::{DialogState, StateData, StateKey, DEEP_LINK_KEY, NEXT_WORKFLOW_KEY};
pub use repository::StateRepository;

#[cfg(test)]
pub use repository::MockStateRepository;

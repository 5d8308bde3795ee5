//! Domain layer - dialog state, workflow definitions and collaborator traits

pub mod account;
pub mod error;
pub mod input;
pub mod messenger;
pub mod pagination;
pub mod state;
pub mod workflow;

pub use account::{Account, AccountService, Group, Order, Rating};
pub use error::DomainError;
pub use input::{CallbackData, DeepLinkData, InboundEvent, NumberedMenu, UserInput};
pub use messenger::{Button, ButtonRow, ChatRef, ChoiceResolver, MessageListener, Messenger};
pub use pagination::PaginationState;
pub use state::{DialogState, StateData, StateKey, StateRepository};
pub use workflow::{
    Step, StepId, StepOutcome, StepResult, Workflow, WorkflowError, WorkflowId, WorkflowRegistry,
};

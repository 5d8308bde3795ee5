//! Account domain - the back-office collaborator injected into workflow steps

mod entity;
mod service;

pub use entity::{Account, Group, Order, Rating, MAX_SCORE, MIN_SCORE};
pub use service::AccountService;

#[cfg(test)]
pub use service::MockAccountService;

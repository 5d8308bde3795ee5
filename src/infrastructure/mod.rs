//! Infrastructure layer - engine, persistence and channel adapters

pub mod account;
pub mod engine;
pub mod logging;
pub mod messenger;
pub mod state;

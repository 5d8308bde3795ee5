//! Dialog state persistence backends

mod factory;
mod in_memory;
mod postgres;

pub use factory::{StateBackend, StateStoreConfig, StateStoreFactory};
pub use in_memory::InMemoryStateRepository;
pub use postgres::{PostgresConfig, PostgresStateRepository, DEFAULT_TABLE_NAME};

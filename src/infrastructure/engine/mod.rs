//! Dialog orchestration

mod dialog_engine;
mod locks;

pub use dialog_engine::{DialogEngine, EngineConfig, DEFAULT_MAX_TRANSITIONS};
pub use locks::{UserLockGuard, UserLocks};

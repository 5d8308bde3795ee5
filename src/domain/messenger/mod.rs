//! Messenger domain - channel delivery contracts used by steps

mod entity;
mod channel;

pub use entity::{Button, ButtonRow, ChatRef, FileSource, OutgoingFile};
pub use channel::{ChoiceResolver, MessageListener, Messenger};

#[cfg(test)]
pub use channel::mock;

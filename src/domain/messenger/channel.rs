//! Messenger collaborator traits

use async_trait::async_trait;

use super::entity::{Button, ButtonRow, ChatRef, OutgoingFile};
use crate::domain::input::Choice;
use crate::domain::DomainError;

/// Channel delivery used by steps. The engine never calls it directly.
#[async_trait]
pub trait Messenger: Send + Sync + std::fmt::Debug {
    /// Send a plain text message
    async fn send_text(&self, chat: &ChatRef, text: &str) -> Result<(), DomainError>;

    /// Send a persistent reply menu made of label rows
    async fn send_menu(
        &self,
        chat: &ChatRef,
        text: &str,
        rows: &[Vec<String>],
    ) -> Result<(), DomainError>;

    /// Send inline options, one button per row
    async fn send_inline_options(
        &self,
        chat: &ChatRef,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DomainError>;

    /// Send an inline button grid; returns the message id when the channel can edit it later
    async fn send_inline_grid(
        &self,
        chat: &ChatRef,
        text: &str,
        rows: &[ButtonRow],
    ) -> Result<Option<String>, DomainError>;

    /// Replace the grid of a previously sent message
    async fn edit_inline_grid(
        &self,
        chat: &ChatRef,
        message_id: &str,
        text: &str,
        rows: &[ButtonRow],
    ) -> Result<(), DomainError>;

    /// Ask the user to share their phone number
    async fn send_contact_request(
        &self,
        chat: &ChatRef,
        text: &str,
        button_label: &str,
    ) -> Result<(), DomainError>;

    /// Send a file attachment
    async fn send_file(&self, chat: &ChatRef, file: &OutgoingFile) -> Result<(), DomainError>;

    /// Show a typing indicator
    async fn send_typing(&self, chat: &ChatRef) -> Result<(), DomainError>;
}

/// Resolves typed numerals on text-only channels to the choice last offered in that chat
#[async_trait]
pub trait ChoiceResolver: Send + Sync + std::fmt::Debug {
    async fn resolve(&self, chat: &ChatRef, text: &str) -> Option<Choice>;
}

/// Fire-and-forget mirror of inbound and outbound text.
///
/// Invoked by channel adapters; implementations must not block.
pub trait MessageListener: Send + Sync + std::fmt::Debug {
    fn on_inbound(&self, chat: &ChatRef, text: &str);

    fn on_outbound(&self, chat: &ChatRef, text: &str);
}

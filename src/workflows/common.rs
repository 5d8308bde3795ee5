//! Helpers shared by the concrete workflows

use crate::domain::account::Account;
use crate::domain::input::UserInput;
use crate::domain::messenger::{ButtonRow, ChatRef, Messenger};
use crate::domain::state::DialogState;
use crate::domain::DomainError;

use super::WorkflowServices;

/// Data key holding the id of the message showing a paged list
pub const LIST_MESSAGE_KEY: &str = "list_message_id";

/// Send a paged list, or edit it in place when it was already shown.
///
/// Returns the id of the message to edit on the next page turn.
pub async fn show_grid(
    messenger: &dyn Messenger,
    chat: &ChatRef,
    text: &str,
    rows: &[ButtonRow],
    message_id: Option<&str>,
) -> Result<Option<String>, DomainError> {
    match message_id {
        Some(id) => {
            messenger.edit_inline_grid(chat, id, text, rows).await?;
            Ok(Some(id.to_string()))
        }
        None => messenger.send_inline_grid(chat, text, rows).await,
    }
}

/// What the user did with a paged selection list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    Page(u32),
    Select(String),
    Back,
    Ignore,
    Unrecognized,
}

impl ListAction {
    pub fn from_input(input: &UserInput) -> Self {
        let Some(data) = input.callback_data() else {
            return Self::Unrecognized;
        };

        if let Some(page) = data.page_number() {
            Self::Page(page)
        } else if let Some(id) = data.selected_id() {
            Self::Select(id.to_string())
        } else if data.is_back() || data.is_cancel() {
            Self::Back
        } else if data.is_noop() {
            Self::Ignore
        } else {
            Self::Unrecognized
        }
    }
}

/// Account linked to the chat of `state`
pub async fn linked_account(
    services: &WorkflowServices,
    state: &DialogState,
) -> Result<Option<Account>, DomainError> {
    services
        .accounts
        .find_account(state.platform(), state.user_id())
        .await
}

/// Plain text the user typed, ignoring slash commands
pub fn typed_text(input: &UserInput) -> Option<&str> {
    input
        .text_value()
        .filter(|text| !text.starts_with('/') && input.callback_data.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_action_from_input() {
        assert_eq!(
            ListAction::from_input(&UserInput::callback("wf:page:2")),
            ListAction::Page(2)
        );
        assert_eq!(
            ListAction::from_input(&UserInput::callback("wf:select:g3")),
            ListAction::Select("g3".to_string())
        );
        assert_eq!(
            ListAction::from_input(&UserInput::callback("wf:back")),
            ListAction::Back
        );
        assert_eq!(
            ListAction::from_input(&UserInput::callback("wf:noop")),
            ListAction::Ignore
        );
        assert_eq!(
            ListAction::from_input(&UserInput::text("group 3")),
            ListAction::Unrecognized
        );
    }

    #[test]
    fn test_typed_text_skips_commands() {
        assert_eq!(typed_text(&UserInput::text(" Ann ")), Some("Ann"));
        assert_eq!(typed_text(&UserInput::text("/start")), None);
        assert_eq!(typed_text(&UserInput::callback("wf:confirm")), None);
    }
}

//! Normalized user input

use serde::{Deserialize, Serialize};

use super::callback::CallbackData;
use super::numbered_menu::Choice;
use super::phone::normalize_phone;

/// Channel event as delivered by an adapter, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Message {
        text: String,
        message_id: Option<String>,
    },
    Callback {
        data: String,
        message_id: Option<String>,
    },
    Contact {
        phone: String,
    },
}

impl InboundEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message { .. } => "message",
            Self::Callback { .. } => "callback",
            Self::Contact { .. } => "contact",
        }
    }

    /// Normalize into the single shape steps consume.
    ///
    /// `resolved` is the choice a text-only channel matched for a typed
    /// numeral; it turns the message into the equivalent button press.
    pub fn normalize(self, resolved: Option<Choice>) -> UserInput {
        match self {
            Self::Message { text, message_id } => match resolved {
                Some(choice) => UserInput {
                    text: Some(choice.label),
                    callback_data: choice.token,
                    phone: None,
                    message_id,
                },
                None => UserInput::text(text).with_message_id(message_id),
            },
            Self::Callback { data, message_id } => {
                UserInput::callback(data).with_message_id(message_id)
            }
            Self::Contact { phone } => UserInput::contact(phone),
        }
    }
}

/// Input handed to [`Step::handle_input`](crate::domain::workflow::Step::handle_input)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    pub text: Option<String>,
    pub callback_data: Option<String>,
    pub phone: Option<String>,
    pub message_id: Option<String>,
}

impl UserInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn callback(data: impl Into<String>) -> Self {
        Self {
            callback_data: Some(data.into()),
            ..Default::default()
        }
    }

    /// Shared contact; the phone is normalized when it is valid
    pub fn contact(phone: impl Into<String>) -> Self {
        let phone = phone.into();
        let phone = normalize_phone(&phone).unwrap_or_else(|_| phone.trim().to_string());
        Self {
            phone: Some(phone),
            ..Default::default()
        }
    }

    pub fn with_message_id(mut self, message_id: Option<String>) -> Self {
        self.message_id = message_id;
        self
    }

    /// Trimmed, non-empty message text
    pub fn text_value(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Decoded callback token, if the input carries an engine token
    pub fn callback_data(&self) -> Option<CallbackData> {
        self.callback_data.as_deref().and_then(CallbackData::decode)
    }

    /// Shared phone, or typed text for channels without contact sharing
    pub fn phone_or_text(&self) -> Option<&str> {
        self.phone.as_deref().or_else(|| self.text_value())
    }

    pub fn is_command(&self, command: &str) -> bool {
        self.text_value()
            .and_then(|text| text.strip_prefix('/'))
            .is_some_and(|text| text.split_whitespace().next() == Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_normalization() {
        let input = InboundEvent::Message {
            text: "  hello ".to_string(),
            message_id: Some("7".to_string()),
        }
        .normalize(None);

        assert_eq!(input.text_value(), Some("hello"));
        assert_eq!(input.message_id.as_deref(), Some("7"));
        assert!(input.callback_data().is_none());
    }

    #[test]
    fn test_resolved_numeral_becomes_button_press() {
        let choice = Choice {
            label: "Order 12".to_string(),
            token: Some(CallbackData::select("12").encode()),
        };
        let input = InboundEvent::Message {
            text: "2".to_string(),
            message_id: None,
        }
        .normalize(Some(choice));

        let callback = input.callback_data().unwrap();
        assert_eq!(callback.selected_id(), Some("12"));
        assert_eq!(input.text_value(), Some("Order 12"));

        let pressed = InboundEvent::Callback {
            data: "wf:select:12".to_string(),
            message_id: None,
        }
        .normalize(None);
        assert_eq!(pressed.callback_data(), input.callback_data());
    }

    #[test]
    fn test_contact_normalizes_phone() {
        let input = InboundEvent::Contact {
            phone: "7 916 123 45 67".to_string(),
        }
        .normalize(None);
        assert_eq!(input.phone.as_deref(), Some("+79161234567"));
        assert_eq!(input.phone_or_text(), Some("+79161234567"));
    }

    #[test]
    fn test_is_command() {
        assert!(UserInput::text("/start school_1").is_command("start"));
        assert!(!UserInput::text("start").is_command("start"));
        assert!(!UserInput::callback("wf:noop").is_command("start"));
    }
}

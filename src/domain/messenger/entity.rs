//! Messenger value types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::input::CallbackData;

/// Routing identity of a conversation.
///
/// `chat_id` may differ from `user_id` on some channels (group chats,
/// business accounts).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatRef {
    pub platform: String,
    pub user_id: String,
    pub chat_id: String,
}

impl ChatRef {
    pub fn new(
        platform: impl Into<String>,
        user_id: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            user_id: user_id.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Direct chat where the chat id equals the user id
    pub fn direct(platform: impl Into<String>, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self {
            platform: platform.into(),
            chat_id: user_id.clone(),
            user_id,
        }
    }
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform, self.user_id)
    }
}

/// Interactive button carrying a callback token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    pub callback_data: String,
}

impl Button {
    pub fn new(text: impl Into<String>, callback: CallbackData) -> Self {
        Self {
            text: text.into(),
            callback_data: callback.encode(),
        }
    }

    /// Inert button used to keep row layout stable
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::new(text, CallbackData::noop())
    }

    pub fn callback(&self) -> Option<CallbackData> {
        CallbackData::decode(&self.callback_data)
    }

    pub fn is_noop(&self) -> bool {
        self.callback().is_some_and(|data| data.is_noop())
    }
}

/// Row of inline buttons
pub type ButtonRow = Vec<Button>;

/// Where the bytes of an outgoing file come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Url(String),
    Bytes(Vec<u8>),
}

/// File attachment sent by a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingFile {
    pub file_name: String,
    pub source: FileSource,
    pub caption: Option<String>,
}

impl OutgoingFile {
    pub fn url(file_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            source: FileSource::Url(url.into()),
            caption: None,
        }
    }

    pub fn bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            source: FileSource::Bytes(bytes),
            caption: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_chat_ref() {
        let chat = ChatRef::direct("telegram", "42");
        assert_eq!(chat.chat_id, "42");
        assert_eq!(chat.to_string(), "telegram:42");
    }

    #[test]
    fn test_button_tokens() {
        let button = Button::new("Pick", CallbackData::select("9"));
        assert_eq!(button.callback_data, "wf:select:9");
        assert!(!button.is_noop());
        assert!(Button::placeholder(" ").is_noop());
    }
}

//! Per-platform messenger dispatch

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::messenger::{Button, ButtonRow, ChatRef, Messenger, OutgoingFile};
use crate::domain::DomainError;

/// Routes each call to the messenger registered for `chat.platform`, so
/// steps hold a single `Arc<dyn Messenger>` whatever channel the user is on
#[derive(Debug, Default)]
pub struct MessengerRouter {
    messengers: HashMap<String, Arc<dyn Messenger>>,
}

impl MessengerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform(mut self, platform: impl Into<String>, messenger: Arc<dyn Messenger>) -> Self {
        self.messengers.insert(platform.into(), messenger);
        self
    }

    pub fn platforms(&self) -> Vec<&str> {
        let mut platforms: Vec<&str> = self.messengers.keys().map(String::as_str).collect();
        platforms.sort_unstable();
        platforms
    }

    fn route(&self, chat: &ChatRef) -> Result<&Arc<dyn Messenger>, DomainError> {
        self.messengers.get(&chat.platform).ok_or_else(|| {
            DomainError::messenger(chat.platform.clone(), "No messenger registered for platform")
        })
    }
}

#[async_trait]
impl Messenger for MessengerRouter {
    async fn send_text(&self, chat: &ChatRef, text: &str) -> Result<(), DomainError> {
        self.route(chat)?.send_text(chat, text).await
    }

    async fn send_menu(
        &self,
        chat: &ChatRef,
        text: &str,
        rows: &[Vec<String>],
    ) -> Result<(), DomainError> {
        self.route(chat)?.send_menu(chat, text, rows).await
    }

    async fn send_inline_options(
        &self,
        chat: &ChatRef,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DomainError> {
        self.route(chat)?.send_inline_options(chat, text, buttons).await
    }

    async fn send_inline_grid(
        &self,
        chat: &ChatRef,
        text: &str,
        rows: &[ButtonRow],
    ) -> Result<Option<String>, DomainError> {
        self.route(chat)?.send_inline_grid(chat, text, rows).await
    }

    async fn edit_inline_grid(
        &self,
        chat: &ChatRef,
        message_id: &str,
        text: &str,
        rows: &[ButtonRow],
    ) -> Result<(), DomainError> {
        self.route(chat)?
            .edit_inline_grid(chat, message_id, text, rows)
            .await
    }

    async fn send_contact_request(
        &self,
        chat: &ChatRef,
        text: &str,
        button_label: &str,
    ) -> Result<(), DomainError> {
        self.route(chat)?
            .send_contact_request(chat, text, button_label)
            .await
    }

    async fn send_file(&self, chat: &ChatRef, file: &OutgoingFile) -> Result<(), DomainError> {
        self.route(chat)?.send_file(chat, file).await
    }

    async fn send_typing(&self, chat: &ChatRef) -> Result<(), DomainError> {
        self.route(chat)?.send_typing(chat).await
    }
}

//! Plain-text messenger for channels without native buttons

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use tracing::debug;

use super::formatting::{render_contact_request, render_file, render_numbered, single_column};
use crate::domain::input::{Choice, NumberedMenu};
use crate::domain::messenger::{
    Button, ButtonRow, ChatRef, ChoiceResolver, MessageListener, Messenger, OutgoingFile,
};
use crate::domain::DomainError;

/// Raw delivery of rendered text to one channel
#[async_trait]
pub trait TextTransport: Send + Sync + Debug {
    fn platform(&self) -> &str;

    /// Deliver `text`, returning the channel message id
    async fn deliver(&self, chat_id: &str, text: &str) -> Result<String, DomainError>;
}

/// Configuration for remembered menus
#[derive(Debug, Clone)]
pub struct TextMessengerConfig {
    /// Chats with a pending menu
    pub max_capacity: u64,
    /// How long a numbered menu stays answerable
    pub choice_ttl: Duration,
}

impl Default for TextMessengerConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            choice_ttl: Duration::from_secs(3600),
        }
    }
}

impl TextMessengerConfig {
    pub fn with_choice_ttl(mut self, ttl: Duration) -> Self {
        self.choice_ttl = ttl;
        self
    }
}

/// Renders menus and buttons as numbered lists.
///
/// The last list offered to each chat is kept so a typed numeral can be
/// resolved back to the option it stands for.
#[derive(Debug)]
pub struct TextMessenger {
    transport: Arc<dyn TextTransport>,
    menus: MokaCache<ChatRef, Arc<NumberedMenu>>,
    listener: Option<Arc<dyn MessageListener>>,
}

impl TextMessenger {
    pub fn new(transport: Arc<dyn TextTransport>) -> Self {
        Self::with_config(transport, TextMessengerConfig::default())
    }

    pub fn with_config(transport: Arc<dyn TextTransport>, config: TextMessengerConfig) -> Self {
        let menus = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.choice_ttl)
            .build();

        Self {
            transport,
            menus,
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn MessageListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn platform(&self) -> &str {
        self.transport.platform()
    }

    /// Menu currently answerable in `chat`
    pub async fn pending_menu(&self, chat: &ChatRef) -> Option<Arc<NumberedMenu>> {
        self.menus.get(chat).await
    }

    async fn deliver(&self, chat: &ChatRef, text: &str) -> Result<String, DomainError> {
        let message_id = self.transport.deliver(&chat.chat_id, text).await?;

        if let Some(listener) = &self.listener {
            listener.on_outbound(chat, text);
        }

        Ok(message_id)
    }

    async fn deliver_menu(
        &self,
        chat: &ChatRef,
        text: &str,
        menu: NumberedMenu,
    ) -> Result<String, DomainError> {
        let rendered = render_numbered(text, &menu);
        let message_id = self.deliver(chat, &rendered).await?;

        if menu.is_empty() {
            self.menus.invalidate(chat).await;
        } else {
            debug!(chat = %chat, choices = menu.len(), "Numbered menu offered");
            self.menus.insert(chat.clone(), Arc::new(menu)).await;
        }

        Ok(message_id)
    }
}

#[async_trait]
impl Messenger for TextMessenger {
    async fn send_text(&self, chat: &ChatRef, text: &str) -> Result<(), DomainError> {
        self.deliver(chat, text).await.map(|_| ())
    }

    async fn send_menu(
        &self,
        chat: &ChatRef,
        text: &str,
        rows: &[Vec<String>],
    ) -> Result<(), DomainError> {
        self.deliver_menu(chat, text, NumberedMenu::from_labels(rows))
            .await
            .map(|_| ())
    }

    async fn send_inline_options(
        &self,
        chat: &ChatRef,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DomainError> {
        let rows = single_column(buttons);
        self.deliver_menu(chat, text, NumberedMenu::from_buttons(&rows))
            .await
            .map(|_| ())
    }

    async fn send_inline_grid(
        &self,
        chat: &ChatRef,
        text: &str,
        rows: &[ButtonRow],
    ) -> Result<Option<String>, DomainError> {
        self.deliver_menu(chat, text, NumberedMenu::from_buttons(rows))
            .await
            .map(Some)
    }

    /// Text channels cannot edit; the new page is sent as a fresh message
    async fn edit_inline_grid(
        &self,
        chat: &ChatRef,
        _message_id: &str,
        text: &str,
        rows: &[ButtonRow],
    ) -> Result<(), DomainError> {
        self.deliver_menu(chat, text, NumberedMenu::from_buttons(rows))
            .await
            .map(|_| ())
    }

    async fn send_contact_request(
        &self,
        chat: &ChatRef,
        text: &str,
        button_label: &str,
    ) -> Result<(), DomainError> {
        self.menus.invalidate(chat).await;
        self.deliver(chat, &render_contact_request(text, button_label))
            .await
            .map(|_| ())
    }

    async fn send_file(&self, chat: &ChatRef, file: &OutgoingFile) -> Result<(), DomainError> {
        self.deliver(chat, &render_file(file)).await.map(|_| ())
    }

    async fn send_typing(&self, _chat: &ChatRef) -> Result<(), DomainError> {
        Ok(())
    }
}

#[async_trait]
impl ChoiceResolver for TextMessenger {
    async fn resolve(&self, chat: &ChatRef, text: &str) -> Option<Choice> {
        let menu = self.menus.get(chat).await?;
        menu.match_input(text).cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::input::CallbackData;

    #[derive(Debug, Default)]
    struct RecordingTransport {
        delivered: Mutex<Vec<(String, String)>>,
    }

    impl RecordingTransport {
        fn texts(&self) -> Vec<String> {
            self.delivered
                .lock()
                .unwrap()
                .iter()
                .map(|(_, text)| text.clone())
                .collect()
        }
    }

    #[async_trait]
    impl TextTransport for RecordingTransport {
        fn platform(&self) -> &str {
            "sms"
        }

        async fn deliver(&self, chat_id: &str, text: &str) -> Result<String, DomainError> {
            let mut delivered = self.delivered.lock().unwrap();
            delivered.push((chat_id.to_string(), text.to_string()));
            Ok(delivered.len().to_string())
        }
    }

    #[derive(Debug, Default)]
    struct CountingListener {
        outbound: Mutex<Vec<String>>,
    }

    impl MessageListener for CountingListener {
        fn on_inbound(&self, _chat: &ChatRef, _text: &str) {}

        fn on_outbound(&self, _chat: &ChatRef, text: &str) {
            self.outbound.lock().unwrap().push(text.to_string());
        }
    }

    fn chat() -> ChatRef {
        ChatRef::direct("sms", "+15550102030")
    }

    fn messenger() -> (TextMessenger, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        (TextMessenger::new(transport.clone()), transport)
    }

    #[tokio::test]
    async fn test_menu_numeral_resolves_to_label() {
        let (messenger, transport) = messenger();
        messenger
            .send_menu(
                &chat(),
                "Main menu",
                &[vec!["Profile".to_string(), "Rate an order".to_string()]],
            )
            .await
            .unwrap();

        assert!(transport.texts()[0].contains("2. Rate an order"));

        let choice = messenger.resolve(&chat(), "2").await.unwrap();
        assert_eq!(choice.label, "Rate an order");
        assert_eq!(choice.token, None);
        assert!(messenger.resolve(&chat(), "3").await.is_none());
    }

    #[tokio::test]
    async fn test_grid_numeral_resolves_to_token() {
        let (messenger, _) = messenger();
        let rows = vec![
            vec![Button::new("Order 11", CallbackData::select("11"))],
            vec![
                Button::placeholder(" "),
                Button::placeholder("1/2"),
                Button::new("»", CallbackData::page(2)),
            ],
        ];

        let message_id = messenger
            .send_inline_grid(&chat(), "Pick an order", &rows)
            .await
            .unwrap();
        assert_eq!(message_id.as_deref(), Some("1"));

        let choice = messenger.resolve(&chat(), "2").await.unwrap();
        let data = CallbackData::decode(choice.token.as_deref().unwrap()).unwrap();
        assert_eq!(data.page_number(), Some(2));
    }

    #[tokio::test]
    async fn test_menus_are_per_chat() {
        let (messenger, _) = messenger();
        messenger
            .send_inline_options(
                &chat(),
                "Score",
                &[Button::new("5", CallbackData::select("5"))],
            )
            .await
            .unwrap();

        let other = ChatRef::direct("sms", "+15550109999");
        assert!(messenger.resolve(&other, "1").await.is_none());
        assert!(messenger.resolve(&chat(), "1").await.is_some());
    }

    #[tokio::test]
    async fn test_contact_request_drops_pending_menu() {
        let (messenger, transport) = messenger();
        messenger
            .send_menu(&chat(), "Menu", &[vec!["Profile".to_string()]])
            .await
            .unwrap();
        messenger
            .send_contact_request(&chat(), "Share your phone", "Share contact")
            .await
            .unwrap();

        assert!(messenger.pending_menu(&chat()).await.is_none());
        assert!(transport.texts()[1].contains("[Share contact]"));
    }

    #[tokio::test]
    async fn test_outbound_listener_sees_rendered_text() {
        let transport = Arc::new(RecordingTransport::default());
        let listener = Arc::new(CountingListener::default());
        let messenger = TextMessenger::new(transport).with_listener(listener.clone());

        messenger.send_text(&chat(), "Hello").await.unwrap();
        messenger.send_typing(&chat()).await.unwrap();

        assert_eq!(*listener.outbound.lock().unwrap(), vec!["Hello".to_string()]);
    }
}

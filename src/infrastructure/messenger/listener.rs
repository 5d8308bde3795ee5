//! Message listener that mirrors channel traffic into the log

use tracing::info;

use crate::domain::messenger::{ChatRef, MessageListener};

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMessageListener;

impl MessageListener for TracingMessageListener {
    fn on_inbound(&self, chat: &ChatRef, text: &str) {
        info!(
            target: "dialog::traffic",
            direction = "in",
            platform = %chat.platform,
            user_id = %chat.user_id,
            text,
            "Inbound message"
        );
    }

    fn on_outbound(&self, chat: &ChatRef, text: &str) {
        info!(
            target: "dialog::traffic",
            direction = "out",
            platform = %chat.platform,
            user_id = %chat.user_id,
            text,
            "Outbound message"
        );
    }
}

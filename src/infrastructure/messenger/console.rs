//! Console transport: the terminal as a text-only channel

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use super::text::TextTransport;
use crate::domain::DomainError;

pub const CONSOLE_PLATFORM: &str = "console";

/// Writes outgoing messages to stdout
#[derive(Debug)]
pub struct ConsoleTransport {
    stdout: Mutex<Stdout>,
    next_id: AtomicU64,
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self {
            stdout: Mutex::new(tokio::io::stdout()),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl TextTransport for ConsoleTransport {
    fn platform(&self) -> &str {
        CONSOLE_PLATFORM
    }

    async fn deliver(&self, _chat_id: &str, text: &str) -> Result<String, DomainError> {
        let mut stdout = self.stdout.lock().await;
        let line = format!("\nbot> {}\n", text.replace('\n', "\n     "));

        stdout
            .write_all(line.as_bytes())
            .await
            .map_err(|e| DomainError::messenger(CONSOLE_PLATFORM, e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| DomainError::messenger(CONSOLE_PLATFORM, e.to_string()))?;

        Ok(self.next_id.fetch_add(1, Ordering::SeqCst).to_string())
    }
}

//! Messenger adapters

mod console;
mod formatting;
mod listener;
mod router;
mod text;

pub use console::{ConsoleTransport, CONSOLE_PLATFORM};
pub use formatting::{chunk_rows, render_numbered, single_column};
pub use listener::TracingMessageListener;
pub use router::MessengerRouter;
pub use text::{TextMessenger, TextMessengerConfig, TextTransport};

//! CLI module for PMP Dialog Engine
//!
//! Provides subcommands:
//! - `chat`: talk to the engine through the console text channel
//! - `check`: build the workflow registry and print it

pub mod chat;
pub mod check;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// PMP Dialog Engine - guided conversations driven by workflow state machines
#[derive(Parser)]
#[command(name = "pmp-dialog-engine")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Chat with the engine from the terminal
    Chat(chat::ChatArgs),

    /// Validate the workflow registry and list every workflow and step
    Check,
}

/// Load `.env` and configuration, then install the log subscriber
fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    if let Err(e) = logging::init_logging(&config.logging) {
        eprintln!("Logging already initialized: {}", e);
    }

    config
}

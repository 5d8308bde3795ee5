//! Chat command - drives the engine from stdin through the console channel

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::domain::messenger::{ChatRef, MessageListener};
use crate::domain::state::StateKey;
use crate::infrastructure::engine::DialogEngine;
use crate::infrastructure::messenger::{TracingMessageListener, CONSOLE_PLATFORM};

const HELP: &str = "Commands: /start [param], /reset, /contact <phone>, /quit";

/// Arguments for the chat command
#[derive(Args, Clone, Debug)]
pub struct ChatArgs {
    /// Platform name the conversation is stored under
    #[arg(long, default_value = CONSOLE_PLATFORM)]
    pub platform: String,

    /// User id on that platform
    #[arg(long, default_value = "console-user")]
    pub user: String,

    /// Send `/start` with this deep-link parameter on launch
    #[arg(long)]
    pub start: Option<String>,
}

/// One line typed into the console
#[derive(Debug, PartialEq, Eq)]
enum ConsoleCommand<'a> {
    Start(Option<&'a str>),
    Reset,
    Contact(&'a str),
    Quit,
    Help,
    Message(&'a str),
    Empty,
}

impl<'a> ConsoleCommand<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (line, None),
        };

        match (command, arg) {
            ("/start", param) => Self::Start(param),
            ("/reset", None) => Self::Reset,
            ("/contact", Some(phone)) => Self::Contact(phone),
            ("/contact", None) | ("/help", _) => Self::Help,
            ("/quit" | "/exit", None) => Self::Quit,
            _ => Self::Message(line),
        }
    }
}

/// Run the interactive console chat
pub async fn run(args: ChatArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let session = Uuid::new_v4();

    async move {
        let channel = crate::create_console_channel(&config, &args.platform);
        let engine = crate::create_console_engine(&config, &channel).await?;
        let chat = ChatRef::direct(args.platform.clone(), args.user.clone());

        info!(platform = %chat.platform, user_id = %chat.user_id, "Console chat started");
        println!("{}", HELP);

        if args.start.is_some() {
            report(engine.handle_start(&chat, args.start.as_deref()).await);
        }

        repl(&engine, &chat).await
    }
    .instrument(info_span!("chat", session = %session))
    .await
}

async fn repl(engine: &DialogEngine, chat: &ChatRef) -> anyhow::Result<()> {
    let listener = TracingMessageListener;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        listener.on_inbound(chat, &line);

        match ConsoleCommand::parse(&line) {
            ConsoleCommand::Empty => {}
            ConsoleCommand::Quit => break,
            ConsoleCommand::Help => println!("{}", HELP),
            ConsoleCommand::Start(param) => report(engine.handle_start(chat, param).await),
            ConsoleCommand::Contact(phone) => report(engine.handle_contact(chat, phone).await),
            ConsoleCommand::Message(text) => {
                report(engine.handle_message(chat, text, None).await)
            }
            ConsoleCommand::Reset => match engine.reset(&StateKey::from(chat)).await {
                Ok(true) => println!("(conversation reset)"),
                Ok(false) => println!("(nothing to reset)"),
                Err(e) => error!(error = %e, "Reset failed"),
            },
        }
    }

    info!("Console chat finished");
    Ok(())
}

/// Engine failures end the turn, not the session
fn report(result: Result<(), crate::domain::WorkflowError>) {
    if let Err(e) = result {
        error!(error = %e, "Failed to process input");
        println!("(something went wrong: {})", e);
    }
}

use clap::Parser;
use pmp_dialog_engine::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Chat(args) => cli::chat::run(args).await,
        Command::Check => cli::check::run().await,
    }
}

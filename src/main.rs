use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use learning_journeys::cli::{Cli, Command};
use learning_journeys::commands::{self, Direction};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    learning_journeys::logging::init().context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        Command::Open(args) => {
            commands::open(&cli.connection, args).await.context("open")?;
        }
        Command::Next(args) => {
            commands::step(&cli.connection, args, Direction::Next)
                .await
                .context("next")?;
        }
        Command::Previous(args) => {
            commands::step(&cli.connection, args, Direction::Previous)
                .await
                .context("previous")?;
        }
        Command::Index(args) => {
            commands::index(&cli.connection, args)
                .await
                .context("index")?;
        }
        Command::Resolve(args) => {
            commands::resolve(&cli.connection, args).context("resolve")?;
        }
    }

    Ok(())
}

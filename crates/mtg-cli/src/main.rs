use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mtg_cli::commands::{create, next, validate};
use mtg_cli::{Cli, Commands, Config, ConfigOverrides, MeetingError};

fn load_config(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Config> {
    let config =
        Config::load_from(config_path, overrides).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

async fn run(cli: &Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let mut stdout = io::stdout();

    match &cli.command {
        Some(Commands::Create(args)) => {
            let config = load_config(config_path, &ConfigOverrides::from(args))?;
            create::run(&mut stdout, config, Utc::now()).await?;
        }
        Some(Commands::Next(args)) => {
            let config = load_config(config_path, &ConfigOverrides::from(args))?;
            let now = args.after.unwrap_or_else(Utc::now);
            next::run(&mut stdout, &config, now, args.json).await?;
        }
        Some(Commands::Validate(args)) => {
            let config = load_config(config_path, &ConfigOverrides::from(args))?;
            validate::run(&mut stdout, &config).await?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<MeetingError>() {
                Some(meeting_err) => {
                    tracing::error!("Meeting creation failed [{}]: {meeting_err}", meeting_err.code());
                    if let Some(cause) = std::error::Error::source(meeting_err) {
                        tracing::error!("Underlying error: {cause}");
                    }
                }
                None => tracing::error!("Unexpected error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

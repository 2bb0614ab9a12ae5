use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gitea_mirror::cli::{self, Cli, Command};
use gitea_mirror::connection::{connection_data, icon};
use gitea_mirror::Mirror;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("gitea_mirror=info"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::ConnectionInfo => {
            println!("{}", serde_json::to_string_pretty(&connection_data())?);
        }
        Command::Icon => println!("{}", icon()),
        Command::Fetch(args) => {
            let config = cli::load_config(&args).context("invalid configuration")?;
            let mirror = Mirror::with_defaults(config)?;

            // Per-repository failures are in the summary; only fatal errors
            // change the exit status.
            let summary = mirror.run().await?;

            println!("{}", summary);
            for failure in summary.failures() {
                println!("  {}: {}", failure.name, failure.outcome);
            }
        }
    }

    Ok(())
}

use std::{error::Error, process::ExitCode};

use clap::Parser;
use migration::{Migrator, MigratorTrait};

use crate::{cli::Cli, commands::Runner, settings::Settings};

mod cli;
mod commands;
mod error;
mod settings;
mod state;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match try_main(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn try_main(cli: Cli) -> Result<(), Box<dyn Error + Send + Sync>> {
    let settings = Settings::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tally={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let engine = build_engine(&settings.database).await?;
    Runner::new(&engine, &settings, cli.account)
        .run(cli.command)
        .await?;
    Ok(())
}

async fn build_engine(
    config: &settings::Database,
) -> Result<engine::Engine, Box<dyn Error + Send + Sync>> {
    let database = sea_orm::Database::connect(config.url.as_str()).await?;
    Migrator::up(&database, None).await?;

    let mut builder = engine::Engine::builder().database(database);
    if let Some(limit) = config.tx_timeout() {
        builder = builder.tx_timeout(limit);
    }
    Ok(builder.build().await?)
}

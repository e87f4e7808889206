use anyhow::Result;
use clap::Parser;
use tracing::debug;

use beacon_core::ApiClient;

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands, DatasetCommands, ReportCommands, WorkspaceCommands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Rendered data owns stdout; diagnostics stay on stderr.
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(format!(
            "beacon_cli={log_level},beacon_core={log_level}"
        )))
        .with_writer(std::io::stderr)
        .init();

    let config = config::CliConfig::load(cli.config.clone())?;
    let opts = commands::OutputOpts::new(
        cli.output.into(),
        cli.output_file.clone(),
        cli.query.clone(),
    );
    let client = ApiClient::new(config.api_url(), config.token()?)?;
    debug!(url = %config.api_url(), "service client ready");

    match cli.command {
        Commands::Workspace { command } => match command {
            WorkspaceCommands::List => commands::workspace::list(&client, &opts).await?,
            WorkspaceCommands::Show { workspace } => {
                commands::workspace::show(&client, &opts, &workspace).await?
            }
        },

        Commands::Dataset { command } => match command {
            DatasetCommands::List { workspace } => {
                commands::dataset::list(&client, &config, &opts, workspace).await?
            }
            DatasetCommands::Show { dataset, workspace } => {
                commands::dataset::show(&client, &config, &opts, workspace, &dataset).await?
            }
            DatasetCommands::Refresh { dataset, workspace } => {
                commands::dataset::refresh(&client, &config, &opts, workspace, &dataset).await?
            }
            DatasetCommands::Query {
                dataset,
                statement,
                workspace,
            } => {
                commands::dataset::query(&client, &config, &opts, workspace, &dataset, &statement)
                    .await?
            }
        },

        Commands::Report { command } => match command {
            ReportCommands::List { workspace } => {
                commands::report::list(&client, &config, &opts, workspace).await?
            }
            ReportCommands::Show { report, workspace } => {
                commands::report::show(&client, &config, &opts, workspace, &report).await?
            }
        },

        Commands::Rest { uri, method, body } => {
            commands::rest::execute(&client, &opts, &uri, &method, body).await?
        }
    }

    Ok(())
}

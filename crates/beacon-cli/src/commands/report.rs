use anyhow::{Context, Result};
use serde_json::Value;

use beacon_core::{resolve, ApiClient};

use crate::config::CliConfig;

use super::{rows_of, OutputOpts};

fn workspace_ref<'a>(option: Option<&'a str>, config: &'a CliConfig) -> Result<&'a str> {
    option
        .or_else(|| config.default_workspace())
        .context("missing --workspace and no default workspace configured")
}

pub async fn list(
    client: &ApiClient,
    config: &CliConfig,
    opts: &OutputOpts,
    workspace: Option<String>,
) -> Result<()> {
    let ws = resolve::workspace_id(client, workspace_ref(workspace.as_deref(), config)?).await?;
    let body: Value = client.fetch(&format!("workspaces/{ws}/reports")).await?;
    opts.render(rows_of(body))
}

pub async fn show(
    client: &ApiClient,
    config: &CliConfig,
    opts: &OutputOpts,
    workspace: Option<String>,
    report: &str,
) -> Result<()> {
    let ws = resolve::workspace_id(client, workspace_ref(workspace.as_deref(), config)?).await?;
    let id = resolve::report_id(client, ws, report).await?;
    let body: Value = client
        .fetch(&format!("workspaces/{ws}/reports/{id}"))
        .await?;
    opts.render(body)
}

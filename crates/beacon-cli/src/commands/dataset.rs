use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::{debug, info};

use beacon_core::output::transcode_stream;
use beacon_core::{resolve, ApiClient, Method};

use crate::config::CliConfig;

use super::{rows_of, OutputOpts};

/// Pick the workspace reference: the explicit option wins, otherwise the
/// configured default; neither is an error, mirroring the service's
/// requirement that datasets are always addressed through a workspace.
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
    let body: Value = client.fetch(&format!("workspaces/{ws}/datasets")).await?;
    opts.render(rows_of(body))
}

pub async fn show(
    client: &ApiClient,
    config: &CliConfig,
    opts: &OutputOpts,
    workspace: Option<String>,
    dataset: &str,
) -> Result<()> {
    let ws = resolve::workspace_id(client, workspace_ref(workspace.as_deref(), config)?).await?;
    let ds = resolve::dataset_id(client, ws, dataset).await?;
    let body: Value = client
        .fetch(&format!("workspaces/{ws}/datasets/{ds}"))
        .await?;
    opts.render(body)
}

pub async fn refresh(
    client: &ApiClient,
    config: &CliConfig,
    opts: &OutputOpts,
    workspace: Option<String>,
    dataset: &str,
) -> Result<()> {
    let ws = resolve::workspace_id(client, workspace_ref(workspace.as_deref(), config)?).await?;
    let ds = resolve::dataset_id(client, ws, dataset).await?;
    let response = client
        .request(
            Method::POST,
            &format!("workspaces/{ws}/datasets/{ds}/refreshes"),
            Some(&json!({"type": "full"})),
        )
        .await?;
    match response {
        Some(body) => opts.render(body),
        None => {
            info!(dataset = %ds, "refresh accepted");
            Ok(())
        }
    }
}

/// Execute a tabular query and stream the framed row set straight through
/// the transcoder; rows render as they arrive instead of being buffered.
pub async fn query(
    client: &ApiClient,
    config: &CliConfig,
    opts: &OutputOpts,
    workspace: Option<String>,
    dataset: &str,
    statement: &str,
) -> Result<()> {
    let ws = resolve::workspace_id(client, workspace_ref(workspace.as_deref(), config)?).await?;
    let ds = resolve::dataset_id(client, ws, dataset).await?;
    let frames = client
        .stream_rows(
            &format!("workspaces/{ws}/datasets/{ds}/query"),
            &json!({"query": statement}),
        )
        .await?;
    let summary = transcode_stream(opts.encoding, &opts.destination, opts.stage.clone(), frames)
        .await
        .context("failed to render query result stream")?;
    debug!(
        records = summary.records,
        batches = summary.batches,
        "query stream rendered"
    );
    Ok(())
}

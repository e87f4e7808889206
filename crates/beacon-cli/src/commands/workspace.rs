use anyhow::Result;
use serde_json::Value;

use beacon_core::{resolve, ApiClient};

use super::{rows_of, OutputOpts};

pub async fn list(client: &ApiClient, opts: &OutputOpts) -> Result<()> {
    let body: Value = client.fetch("workspaces").await?;
    opts.render(rows_of(body))
}

pub async fn show(client: &ApiClient, opts: &OutputOpts, reference: &str) -> Result<()> {
    let id = resolve::workspace_id(client, reference).await?;
    let body: Value = client.fetch(&format!("workspaces/{id}")).await?;
    opts.render(body)
}

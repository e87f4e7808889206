//! Identifier resolution.
//!
//! Command parameters accept either a UUID or a human-readable name. UUIDs
//! pass through untouched; names are resolved against the matching list
//! endpoint with a case-insensitive comparison.

use uuid::Uuid;

use crate::error::ApiError;
use crate::rest::{ApiClient, Envelope};
use crate::types::{Dataset, Report, Workspace};

pub async fn workspace_id(client: &ApiClient, reference: &str) -> Result<Uuid, ApiError> {
    if let Ok(id) = Uuid::parse_str(reference) {
        return Ok(id);
    }
    let Envelope { value } = client.fetch::<Envelope<Workspace>>("workspaces").await?;
    value
        .into_iter()
        .find(|w| w.name.eq_ignore_ascii_case(reference))
        .map(|w| w.id)
        .ok_or_else(|| ApiError::not_found("workspace", reference))
}

pub async fn dataset_id(
    client: &ApiClient,
    workspace: Uuid,
    reference: &str,
) -> Result<Uuid, ApiError> {
    if let Ok(id) = Uuid::parse_str(reference) {
        return Ok(id);
    }
    let path = format!("workspaces/{workspace}/datasets");
    let Envelope { value } = client.fetch::<Envelope<Dataset>>(&path).await?;
    value
        .into_iter()
        .find(|d| d.name.eq_ignore_ascii_case(reference))
        .map(|d| d.id)
        .ok_or_else(|| ApiError::not_found("dataset", reference))
}

pub async fn report_id(
    client: &ApiClient,
    workspace: Uuid,
    reference: &str,
) -> Result<Uuid, ApiError> {
    if let Ok(id) = Uuid::parse_str(reference) {
        return Ok(id);
    }
    let path = format!("workspaces/{workspace}/reports");
    let Envelope { value } = client.fetch::<Envelope<Report>>(&path).await?;
    value
        .into_iter()
        .find(|r| r.name.eq_ignore_ascii_case(reference))
        .map(|r| r.id)
        .ok_or_else(|| ApiError::not_found("report", reference))
}

//! Resource models for the service API.
//!
//! Only the fields the CLI actually inspects are typed; rendering always
//! goes through the raw JSON body so unknown fields survive untouched.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub is_read_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub configured_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub web_url: Option<String>,
}

use anyhow::{bail, Context, Result};
use serde_json::Value;

use beacon_core::{ApiClient, Method};

use super::OutputOpts;

/// Methods accepted by the raw escape hatch.
const ALLOWED_METHODS: &[&str] = &["delete", "get", "head", "options", "patch", "post", "put"];

pub async fn execute(
    client: &ApiClient,
    opts: &OutputOpts,
    uri: &str,
    method: &str,
    body: Option<String>,
) -> Result<()> {
    let method = method.to_ascii_lowercase();
    if !ALLOWED_METHODS.contains(&method.as_str()) {
        bail!(
            "unsupported method '{method}' (expected one of: {})",
            ALLOWED_METHODS.join(", ")
        );
    }
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .context("invalid HTTP method")?;

    let body = body.as_deref().map(load_body).transpose()?;
    let response = client.request(method, uri, body.as_ref()).await?;
    match response {
        Some(body) => opts.render(body),
        None => Ok(()),
    }
}

/// Inline JSON, or `@path` to load the body from a file.
fn load_body(spec: &str) -> Result<Value> {
    let raw = match spec.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read body file {path}"))?,
        None => spec.to_string(),
    };
    serde_json::from_str(&raw).context("request body is not valid JSON")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_bodies_parse_as_json() {
        assert_eq!(load_body(r#"{"a":1}"#).unwrap()["a"], 1);
        assert!(load_body("not json").is_err());
    }

    #[test]
    fn at_prefixed_bodies_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.json");
        std::fs::write(&path, r#"{"from":"file"}"#).unwrap();

        let spec = format!("@{}", path.display());
        assert_eq!(load_body(&spec).unwrap()["from"], "file");
    }
}

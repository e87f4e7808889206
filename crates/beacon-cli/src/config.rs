use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI configuration, loaded from TOML with environment overrides.
///
/// Precedence, highest first: environment (`BEACON_API_URL`,
/// `BEACON_TOKEN`), config file, built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Service endpoint and credentials
    #[serde(default)]
    pub api: ApiConfig,

    /// Fallback values for omitted command options
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the service API
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Access token; prefer the BEACON_TOKEN environment variable
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Workspace used when a command omits --workspace
    pub workspace: Option<String>,
}

fn default_api_url() -> String {
    "https://api.beacon.example/v1".to_string()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("beacon/config.toml"))
}

impl CliConfig {
    /// Load configuration from an explicit path or the default location.
    /// A missing default file is not an error; a missing explicit one is.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (Some(path), true),
            None => (default_config_path(), false),
        };
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            if explicit {
                anyhow::bail!("config file not found: {}", path.display());
            }
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Effective API base URL.
    pub fn api_url(&self) -> String {
        std::env::var("BEACON_API_URL").unwrap_or_else(|_| self.api.url.clone())
    }

    /// Effective access token; absence is an error at client construction,
    /// not at startup, so token-free invocations like `--help` still work.
    pub fn token(&self) -> Result<String> {
        std::env::var("BEACON_TOKEN")
            .ok()
            .or_else(|| self.api.token.clone())
            .context("no access token configured: set BEACON_TOKEN or [api].token in the config file")
    }

    /// Workspace reference for commands that omitted --workspace.
    pub fn default_workspace(&self) -> Option<&str> {
        self.defaults.workspace.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_falls_back_to_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.api.url, default_api_url());
        assert!(config.default_workspace().is_none());
    }

    // Explicit paths must exist.
    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = CliConfig::load(Some(PathBuf::from("/no/such/config.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[api]\nurl = \"http://localhost:9900\"\n\n[defaults]\nworkspace = \"Sales\"\n",
        )
        .unwrap();

        let config = CliConfig::load(Some(path)).unwrap();
        assert_eq!(config.api.url, "http://localhost:9900");
        assert_eq!(config.default_workspace(), Some("Sales"));
    }
}

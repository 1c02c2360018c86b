//! Server-side configuration, loaded from a TOML file.
//!
//! The context name resolves to `/etc/salonhub/<name>.toml`; a value
//! containing `/` or `.` is treated as a direct path.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address for the HTTP server.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Tenant/application identifier. Every document key is scoped by
    /// this value; it is resolved here, once, and injected into the
    /// identity service.
    #[serde(default = "default_tenant")]
    pub tenant: String,

    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory for persistent data.
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret used to verify provider-issued bearer tokens.
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL of the identity provider's account directory API.
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapConfig {
    /// Email of the account to promote to admin at startup, if any.
    #[serde(default)]
    pub admin_email: Option<String>,
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_tenant() -> String {
    "salonhub".to_string()
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/salonhub/{}.toml", name_or_path))
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

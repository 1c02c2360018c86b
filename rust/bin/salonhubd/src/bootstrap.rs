//! Bootstrap — first-start checks and admin promotion.
//!
//! When salonhubd starts:
//! 1. Verify the config carries the secrets and endpoints it needs.
//! 2. If a bootstrap admin email is configured, promote that account —
//!    without this step no account could ever become admin, since every
//!    promotion path requires an existing admin.

use std::sync::Arc;

use tracing::{info, warn};

use identity::service::IdentityService;

use crate::config::ServerConfig;

/// Verify server configuration is ready for production use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.jwt.secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    if config.directory.base_url.is_empty() {
        anyhow::bail!("Directory base_url is empty in configuration.");
    }
    Ok(())
}

/// Promote the configured bootstrap admin, if any. Failure here is logged
/// but does not stop the server: the directory may simply not know the
/// account yet.
pub async fn promote_bootstrap_admin(config: &ServerConfig, svc: &Arc<IdentityService>) {
    let Some(email) = config.bootstrap.admin_email.as_deref() else {
        return;
    };
    match svc.promote_bootstrap_admin(email).await {
        Ok(uid) => info!("Bootstrap admin '{}' ready (uid {})", email, uid),
        Err(e) => warn!("Bootstrap admin promotion for '{}' failed: {}", email, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DirectoryConfig, JwtConfig, StorageConfig};

    fn base_config() -> ServerConfig {
        ServerConfig {
            listen: "0.0.0.0:8080".to_string(),
            tenant: "salonhub".to_string(),
            storage: StorageConfig {
                data_dir: "/tmp".to_string(),
            },
            jwt: JwtConfig {
                secret: "test".to_string(),
            },
            directory: DirectoryConfig {
                base_url: "http://localhost:9099".to_string(),
            },
            bootstrap: Default::default(),
        }
    }

    #[test]
    fn test_verify_config_ok() {
        assert!(verify_config(&base_config()).is_ok());
    }

    #[test]
    fn test_verify_config_empty_secret() {
        let mut config = base_config();
        config.jwt.secret = String::new();
        assert!(verify_config(&config).is_err());
    }

    #[test]
    fn test_verify_config_empty_base_url() {
        let mut config = base_config();
        config.directory.base_url = String::new();
        assert!(verify_config(&config).is_err());
    }
}

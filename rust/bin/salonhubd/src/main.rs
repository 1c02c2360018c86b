//! `salonhubd` — the SalonHub identity server binary.
//!
//! Usage:
//!   salonhubd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/salonhub/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;

use std::sync::Arc;

use clap::Parser;
use salonhub_core::Module;
use tracing::info;

use config::ServerConfig;

/// SalonHub identity server.
#[derive(Parser, Debug)]
#[command(name = "salonhubd", about = "SalonHub identity server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides the config file).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    let listen = cli.listen.unwrap_or_else(|| server_config.listen.clone());

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = salonhub_core::ServiceConfig {
        data_dir: Some(data_dir.clone()),
        listen: listen.clone(),
        ..Default::default()
    };

    let store: Arc<dyn salonhub_kv::DocStore> = Arc::new(
        salonhub_kv::RedbStore::open(&core_config.resolve_db_path())
            .map_err(|e| anyhow::anyhow!("failed to open document store: {}", e))?,
    );

    // Identity provider client (token verification + account directory).
    let provider: Arc<dyn identity::provider::IdentityProvider> =
        Arc::new(identity::provider::DirectoryProvider::new(
            server_config.jwt.secret.clone(),
            server_config.directory.base_url.clone(),
        ));

    let identity_config = identity::service::IdentityConfig {
        tenant: server_config.tenant.clone(),
        ..Default::default()
    };
    let identity_module =
        identity::IdentityModule::new(Arc::clone(&store), provider, identity_config);
    info!("Identity module initialized (tenant '{}')", server_config.tenant);

    // Bootstrap: promote the configured admin, if any.
    bootstrap::promote_bootstrap_admin(&server_config, identity_module.service()).await;

    // Build router.
    let app = axum::Router::new()
        .route("/health", axum::routing::get(health))
        .merge(identity_module.routes());

    // Start server.
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("SalonHub server listening on {}", listen);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({"status": "ok"}))
}

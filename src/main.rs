use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use adapter::database::connect_database_with;
use anyhow::{Context, Result};
use registry::{AppRegistry, AppRegistryImpl};
use shared::config::AppConfig;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger()?;
    bootstrap().await
}

fn init_logger() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

async fn bootstrap() -> Result<()> {
    let app_config = AppConfig::new()?;
    let pool = connect_database_with(&app_config.database);
    let registry: AppRegistry = Arc::new(AppRegistryImpl::new(pool));

    let app = api::route::v1::routes().with_state(registry);

    let addr = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 8080);
    let listener = TcpListener::bind(&addr)
        .await
        .context("failed to bind TCP listener")?;
    tracing::info!("Server running on {}", addr);

    axum::serve(listener, app)
        .await
        .context("unexpected error happened in server")
}

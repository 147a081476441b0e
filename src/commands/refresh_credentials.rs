//! Standalone credential refresh

use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;
use crate::services::PipelineService;

pub async fn execute(config_path: Option<String>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let conn_id = config.store.conn_id.clone();

    let service = PipelineService::new(config)?;
    let secrets = service.prepare().await?;

    service
        .refresh_credentials(&secrets)
        .await
        .context("Credential refresh failed")?;

    info!("✅ Connection {} refreshed", conn_id);
    Ok(())
}

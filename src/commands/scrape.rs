//! Standalone container task, using whatever credentials are stored

use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;
use crate::services::PipelineService;

pub async fn execute(config_path: Option<String>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let service = PipelineService::new(config)?;
    let secrets = service.prepare().await?;

    service
        .scrape(&secrets)
        .await
        .context("Scraper container run failed")?;

    info!("✅ Scraper container completed");
    Ok(())
}

//! Full pipeline run, once or on the daily schedule

use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;
use crate::services::{scheduler, PipelineService};

pub async fn execute(
    config_path: Option<String>,
    schedule: bool,
    skip_refresh: bool,
) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let service = PipelineService::new(config)?;

    if schedule {
        info!("Starting daily scheduler (fires at UTC midnight)");
        let service = &service;
        scheduler::run_daily(move || async move {
            service.execute(skip_refresh).await.map(|_| ())
        })
        .await
    } else {
        service
            .execute(skip_refresh)
            .await
            .context("Pipeline run failed")?;
        Ok(())
    }
}

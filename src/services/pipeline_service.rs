//! Pipeline service - orchestrates the two-task run
//!
//! Secrets are fetched once per run, then the tasks execute strictly in
//! sequence: refresh the registry credentials, then launch the scraper
//! container. A task failure, after its retry budget, aborts the run.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::future::Future;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::pipeline::{PipelinePhase, PipelineStep, RetryPolicy, StepResult};
use crate::domain::{registry_host, ConnectionRecord, RegistryCredentials};
use crate::error::PipelineError;
use crate::infrastructure::{
    ConnectionStore, ContainerSpec, DockerClient, DopplerClient, EcrAuthClient, PipelineSecrets,
};

/// A task failure that exhausted its retry budget
#[derive(Debug)]
pub struct SequenceError<E> {
    pub step: PipelineStep,
    pub attempts: u32,
    pub error: E,
}

/// Run steps strictly in order under the retry policy.
///
/// Each step gets `policy.max_attempts()` tries with `policy.delay` between
/// them. A step's final failure aborts the sequence, so later steps never
/// start - the ordering edge the container task depends on.
pub async fn run_sequence<E, F, Fut>(
    steps: &[PipelineStep],
    policy: RetryPolicy,
    mut run: F,
) -> Result<Vec<StepResult>, SequenceError<E>>
where
    E: Display,
    F: FnMut(PipelineStep) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let mut results = Vec::new();

    for &step in steps {
        info!("{} Starting: {}", step.emoji(), step.name());
        let start = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match run(step).await {
                Ok(()) => {
                    info!(
                        "{} {} completed in {:.1}s",
                        "✅".green(),
                        step.name(),
                        start.elapsed().as_secs_f64()
                    );
                    results.push(StepResult::completed(step, attempt, start.elapsed()));
                    break;
                }
                Err(e) if attempt < policy.max_attempts() => {
                    warn!(
                        "{} attempt {} failed: {}. Retrying in {:?}",
                        step.name(),
                        attempt,
                        e,
                        policy.delay
                    );
                    tokio::time::sleep(policy.delay).await;
                }
                Err(e) => {
                    info!(
                        "{} {} failed after {} attempts: {}",
                        "❌".red(),
                        step.name(),
                        attempt,
                        e
                    );
                    return Err(SequenceError {
                        step,
                        attempts: attempt,
                        error: e,
                    });
                }
            }
        }
    }

    Ok(results)
}

/// Service for orchestrating pipeline runs
pub struct PipelineService {
    config: AppConfig,
    doppler: DopplerClient,
    store: ConnectionStore,
}

impl PipelineService {
    /// Create a service from loaded configuration.
    ///
    /// Fails fast when DOPPLER_SERVICE_TOKEN is not exported.
    pub fn new(config: AppConfig) -> Result<Self, PipelineError> {
        let doppler = DopplerClient::from_env()?;
        let store = ConnectionStore::new(config.store.path.as_str());
        Ok(Self {
            config,
            doppler,
            store,
        })
    }

    /// One-time secret fetch preceding both tasks
    pub async fn prepare(&self) -> Result<PipelineSecrets, PipelineError> {
        let secrets = self
            .doppler
            .pipeline_secrets(&self.config.doppler.project, &self.config.doppler.config)
            .await?;
        Ok(secrets)
    }

    /// Execute a full pipeline run
    pub async fn execute(&self, skip_refresh: bool) -> Result<Vec<StepResult>, PipelineError> {
        let secrets = self.prepare().await?;

        let steps = if skip_refresh {
            info!("Reusing stored credentials (--skip-refresh)");
            PipelineStep::scrape_only()
        } else {
            PipelineStep::full_sequence()
        };
        let policy = RetryPolicy::new(self.config.retry.retries, self.config.retry.delay()?);

        self.print_header(&steps, &secrets);

        let secrets_ref = &secrets;
        match run_sequence(&steps, policy, move |step| {
            self.execute_step(step, secrets_ref)
        })
        .await
        {
            Ok(results) => {
                self.print_summary(&results, PipelinePhase::Completed);
                Ok(results)
            }
            Err(failure) => {
                self.print_summary(&[], PipelinePhase::Failed(failure.step));
                Err(failure.error)
            }
        }
    }

    /// Execute a single pipeline step
    async fn execute_step(
        &self,
        step: PipelineStep,
        secrets: &PipelineSecrets,
    ) -> Result<(), PipelineError> {
        match step {
            PipelineStep::RefreshCredentials => self.refresh_credentials(secrets).await,
            PipelineStep::Scrape => self.scrape(secrets).await,
        }
    }

    /// Rotate the registry login stored under the configured conn_id
    pub async fn refresh_credentials(
        &self,
        secrets: &PipelineSecrets,
    ) -> Result<(), PipelineError> {
        let ecr = EcrAuthClient::connect(&secrets.aws_region).await;
        let auth = ecr.authorization_token().await?;

        let credentials = RegistryCredentials::from_authorization_token(&auth.authorization_token)?;
        let record = ConnectionRecord::docker(
            self.config.store.conn_id.as_str(),
            auth.proxy_endpoint.as_str(),
            credentials,
        );

        self.store.upsert(record)?;
        Ok(())
    }

    /// Pull and run the scraper container, authenticated via the stored record
    pub async fn scrape(&self, secrets: &PipelineSecrets) -> Result<(), PipelineError> {
        let record = self.store.require(&self.config.store.conn_id)?;
        let docker = DockerClient::discover()?;

        docker
            .login(registry_host(&record.host), &record.login, &record.password)
            .await?;

        let image = secrets.image(&self.config.container.tag);

        if self.config.container.force_pull {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap(),
            );
            pb.set_message(format!("Pulling {}", image));
            pb.enable_steady_tick(std::time::Duration::from_millis(100));

            let pulled = docker.pull(&image).await;
            pb.finish_and_clear();
            pulled?;
        }

        let spec = ContainerSpec::from_settings(
            &self.config.container,
            image,
            vec![(
                "DOPPLER_SERVICE_TOKEN".to_string(),
                self.doppler.token().to_string(),
            )],
        );

        docker.run(&spec).await?;
        Ok(())
    }

    fn print_header(&self, steps: &[PipelineStep], secrets: &PipelineSecrets) {
        println!();
        println!(
            "{}",
            "╔════════════════════════════════════════════════════════════╗".bright_blue()
        );
        println!(
            "{}",
            "║  TSA Checkpoint Travel Numbers Pipeline                    ║".bright_blue()
        );
        println!(
            "{}",
            "╚════════════════════════════════════════════════════════════╝".bright_blue()
        );
        println!();
        info!("Image: {}", secrets.image(&self.config.container.tag));
        info!("Connection: {}", self.config.store.conn_id);
        info!("Steps: {}", steps.len());
        println!();
    }

    fn print_summary(&self, results: &[StepResult], phase: PipelinePhase) {
        println!();
        println!(
            "{}",
            "════════════════════════════════════════════════════════════".bright_blue()
        );

        match phase {
            PipelinePhase::Completed => {
                println!(
                    "{}",
                    "✅ Pipeline run completed".bright_green().bold()
                );
            }
            PipelinePhase::Failed(step) => {
                println!(
                    "{}",
                    format!("❌ Pipeline run failed at {}", step.name())
                        .bright_red()
                        .bold()
                );
            }
        }

        println!();
        for result in results {
            println!(
                "   ✅ {} ({:.1}s, {} attempt{})",
                result.step.name(),
                result.duration.as_secs_f64(),
                result.attempts,
                if result.attempts == 1 { "" } else { "s" }
            );
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn immediate_policy(retries: u32) -> RetryPolicy {
        RetryPolicy::new(retries, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_steps_run_in_declared_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let steps = PipelineStep::full_sequence();

        let results = run_sequence(&steps, immediate_policy(1), |step| {
            let calls = Arc::clone(&calls);
            async move {
                calls.lock().unwrap().push(step);
                Ok::<(), String>(())
            }
        })
        .await
        .unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![PipelineStep::RefreshCredentials, PipelineStep::Scrape]
        );
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.attempts == 1));
    }

    #[tokio::test]
    async fn test_scrape_never_starts_after_refresh_failure() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let steps = PipelineStep::full_sequence();

        let failure = run_sequence(&steps, immediate_policy(1), |step| {
            let calls = Arc::clone(&calls);
            async move {
                calls.lock().unwrap().push(step);
                match step {
                    PipelineStep::RefreshCredentials => Err("ecr is down".to_string()),
                    PipelineStep::Scrape => Ok(()),
                }
            }
        })
        .await
        .unwrap_err();

        assert_eq!(failure.step, PipelineStep::RefreshCredentials);
        // Two attempts for the failing task, none for the container task.
        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                PipelineStep::RefreshCredentials,
                PipelineStep::RefreshCredentials
            ]
        );
    }

    #[tokio::test]
    async fn test_transient_failure_recovers_on_retry() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let steps = PipelineStep::full_sequence();

        let results = run_sequence(&steps, immediate_policy(1), |step| {
            let calls = Arc::clone(&calls);
            async move {
                let mut calls = calls.lock().unwrap();
                calls.push(step);
                let refresh_attempts = calls
                    .iter()
                    .filter(|s| **s == PipelineStep::RefreshCredentials)
                    .count();
                drop(calls);
                if step == PipelineStep::RefreshCredentials && refresh_attempts == 1 {
                    Err("transient".to_string())
                } else {
                    Ok(())
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(results[0].attempts, 2);
        assert_eq!(results[1].attempts, 1);
    }

    #[tokio::test]
    async fn test_retry_budget_is_honored() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let steps = vec![PipelineStep::Scrape];

        let failure = run_sequence(&steps, immediate_policy(2), |step| {
            let calls = Arc::clone(&calls);
            async move {
                calls.lock().unwrap().push(step);
                Err::<(), _>("always failing".to_string())
            }
        })
        .await
        .unwrap_err();

        assert_eq!(failure.attempts, 3);
        assert_eq!(calls.lock().unwrap().len(), 3);
    }
}

//! Pipeline domain types
//!
//! Defines the two-task workflow as explicit steps with a fixed ordering
//! edge: credentials are refreshed before the container task may start.

use std::time::Duration;

/// Individual tasks in a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    /// Rotate the ECR login stored in the connection record
    RefreshCredentials,
    /// Pull and run the scraper container
    Scrape,
}

impl PipelineStep {
    /// Get human-readable name for the step
    pub fn name(&self) -> &'static str {
        match self {
            Self::RefreshCredentials => "Refresh Credentials",
            Self::Scrape => "Scrape",
        }
    }

    /// Get emoji for the step
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::RefreshCredentials => "🔑",
            Self::Scrape => "🛫",
        }
    }

    /// The full task sequence, in execution order
    pub fn full_sequence() -> Vec<PipelineStep> {
        vec![Self::RefreshCredentials, Self::Scrape]
    }

    /// The sequence when the operator reuses stored credentials
    pub fn scrape_only() -> Vec<PipelineStep> {
        vec![Self::Scrape]
    }
}

/// Terminal state of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    /// Completed successfully
    Completed,
    /// Failed at a specific step
    Failed(PipelineStep),
}

/// Per-task retry policy
///
/// One generic policy for every task: a fixed number of re-attempts with a
/// fixed delay between them. No backoff, no per-task overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure
    pub retries: u32,
    /// Delay before each re-attempt
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// Total attempts a task may consume
    pub fn max_attempts(&self) -> u32 {
        self.retries + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 1,
            delay: Duration::from_secs(30),
        }
    }
}

/// A completed pipeline step; failures surface as errors, not results
#[derive(Debug)]
pub struct StepResult {
    pub step: PipelineStep,
    pub attempts: u32,
    pub duration: Duration,
}

impl StepResult {
    pub fn completed(step: PipelineStep, attempts: u32, duration: Duration) -> Self {
        Self {
            step,
            attempts,
            duration,
        }
    }
}

//! Pipeline configuration
//!
//! Settings load from an optional YAML file with per-field defaults that
//! reproduce the production deployment, so a bare `tsa-pipeline run` works
//! with nothing but DOPPLER_SERVICE_TOKEN exported.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Top-level configuration for a pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Doppler project/config the secrets come from
    #[serde(default)]
    pub doppler: DopplerSettings,

    /// Container task invocation parameters
    #[serde(default)]
    pub container: ContainerSettings,

    /// Generic per-task retry policy
    #[serde(default)]
    pub retry: RetrySettings,

    /// Connection store location and record identifier
    #[serde(default)]
    pub store: StoreSettings,
}

impl AppConfig {
    /// Load configuration from an optional YAML file.
    ///
    /// With no path, defaults apply. A given path must exist and parse.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                        path: path.to_string(),
                    })?;
                serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    message: e.to_string(),
                })?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.doppler.project.is_empty() {
            return Err(ConfigError::MissingField {
                field: "doppler.project".to_string(),
            });
        }
        if self.doppler.config.is_empty() {
            return Err(ConfigError::MissingField {
                field: "doppler.config".to_string(),
            });
        }
        if self.container.cpus <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "container.cpus".to_string(),
                value: self.container.cpus.to_string(),
            });
        }
        if self.store.conn_id.is_empty() {
            return Err(ConfigError::MissingField {
                field: "store.conn_id".to_string(),
            });
        }
        // Surface an unparseable delay at load time, not mid-run
        self.retry.delay()?;
        Ok(())
    }
}

/// Doppler secret store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DopplerSettings {
    /// Doppler project name
    #[serde(default = "default_doppler_project")]
    pub project: String,

    /// Doppler config (environment) name
    #[serde(default = "default_doppler_config")]
    pub config: String,
}

fn default_doppler_project() -> String {
    "tsa".to_string()
}

fn default_doppler_config() -> String {
    "prd".to_string()
}

impl Default for DopplerSettings {
    fn default() -> Self {
        Self {
            project: default_doppler_project(),
            config: default_doppler_config(),
        }
    }
}

/// Container task settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSettings {
    /// Image tag to run
    #[serde(default = "default_tag")]
    pub tag: String,

    /// Shell the command runs under (invoked with -cx)
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Command line executed inside the container
    #[serde(default = "default_command")]
    pub command: String,

    /// CPU limit
    #[serde(default = "default_cpus")]
    pub cpus: f64,

    /// Memory limit, docker-formatted (e.g. "512m")
    #[serde(default = "default_memory")]
    pub memory: String,

    /// Docker network mode
    #[serde(default = "default_network")]
    pub network: String,

    /// Pull the image before every run
    #[serde(default = "default_true")]
    pub force_pull: bool,

    /// Remove the container after a successful run, keep it on failure
    #[serde(default = "default_true")]
    pub auto_remove: bool,
}

fn default_tag() -> String {
    "latest".to_string()
}

fn default_shell() -> String {
    "/bin/bash".to_string()
}

fn default_command() -> String {
    "run_travel_numbers --environment prod".to_string()
}

fn default_cpus() -> f64 {
    1.0
}

fn default_memory() -> String {
    "512m".to_string()
}

fn default_network() -> String {
    "bridge".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            shell: default_shell(),
            command: default_command(),
            cpus: default_cpus(),
            memory: default_memory(),
            network: default_network(),
            force_pull: true,
            auto_remove: true,
        }
    }
}

/// Retry settings applied uniformly to every task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Extra attempts after the first failure
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Delay before each re-attempt, humantime-formatted (e.g. "30s")
    #[serde(default = "default_retry_delay")]
    pub retry_delay: String,
}

fn default_retries() -> u32 {
    1
}

fn default_retry_delay() -> String {
    "30s".to_string()
}

impl RetrySettings {
    /// Parse the configured delay
    pub fn delay(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(&self.retry_delay).map_err(|_| ConfigError::InvalidValue {
            field: "retry.retry_delay".to_string(),
            value: self.retry_delay.clone(),
        })
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            retry_delay: default_retry_delay(),
        }
    }
}

/// Connection store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Path of the JSON connection store
    #[serde(default = "default_store_path")]
    pub path: String,

    /// Identifier of the registry connection record
    #[serde(default = "default_conn_id")]
    pub conn_id: String,
}

fn default_store_path() -> String {
    std::env::var("TSA_CONNECTIONS_PATH").unwrap_or_else(|_| "connections.json".to_string())
}

fn default_conn_id() -> String {
    "docker_ecr".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            conn_id: default_conn_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_production() {
        let config = AppConfig::default();
        assert_eq!(config.doppler.project, "tsa");
        assert_eq!(config.doppler.config, "prd");
        assert_eq!(config.container.tag, "latest");
        assert_eq!(config.container.memory, "512m");
        assert_eq!(config.retry.retries, 1);
        assert_eq!(config.store.conn_id, "docker_ecr");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_delay_parses() {
        let config = AppConfig::default();
        assert_eq!(config.retry.delay().unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_retry_delay_rejected() {
        let mut config = AppConfig::default();
        config.retry.retry_delay = "not-a-duration".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "doppler:\n  config: stg\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.doppler.project, "tsa");
        assert_eq!(config.doppler.config, "stg");
        assert_eq!(config.container.network, "bridge");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = AppConfig::load(Some("/nonexistent/pipeline.yaml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_zero_cpus_rejected() {
        let mut config = AppConfig::default();
        config.container.cpus = 0.0;
        assert!(config.validate().is_err());
    }
}

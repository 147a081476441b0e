//! Doppler secret store client
//!
//! Fetches the project/environment-scoped secrets that parameterize a run:
//! the registry repository name, the registry login URI, and the region.
//! Authentication is a service token read from DOPPLER_SERVICE_TOKEN.

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

use crate::error::SecretsError;

const DEFAULT_BASE_URL: &str = "https://api.doppler.com";

pub const SECRET_ECR_REPOSITORY_NAME: &str = "ECR_REPOSITORY_NAME";
pub const SECRET_AWS_ECR_LOGIN_URI: &str = "AWS_ECR_LOGIN_URI";
pub const SECRET_AWS_REGION: &str = "AWS_REGION";

/// Client for the Doppler secrets API
pub struct DopplerClient {
    client: Client,
    base_url: String,
    token: String,
}

/// One secret as Doppler returns it
#[derive(Debug, Clone, Deserialize)]
struct SecretValue {
    #[allow(dead_code)]
    raw: Option<String>,
    computed: Option<String>,
}

/// Doppler API response for a secrets listing
#[derive(Debug, Deserialize)]
struct SecretsResponse {
    secrets: HashMap<String, SecretValue>,
}

/// The resolved secrets a pipeline run needs
#[derive(Debug, Clone)]
pub struct PipelineSecrets {
    pub ecr_repository_name: String,
    pub aws_ecr_login_uri: String,
    pub aws_region: String,
}

impl PipelineSecrets {
    /// Full image reference for the scraper container
    pub fn image(&self, tag: &str) -> String {
        format!("{}/{}:{}", self.aws_ecr_login_uri, self.ecr_repository_name, tag)
    }
}

impl DopplerClient {
    /// Create a client from the DOPPLER_SERVICE_TOKEN environment variable
    pub fn from_env() -> Result<Self, SecretsError> {
        let token = std::env::var("DOPPLER_SERVICE_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or(SecretsError::TokenNotSet)?;
        Self::new(token)
    }

    /// Create a client with an explicit token
    pub fn new(token: impl Into<String>) -> Result<Self, SecretsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SecretsError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
        })
    }

    /// The service token, forwarded into the container environment
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Fetch all secrets for a project/config pair
    pub async fn secrets(
        &self,
        project: &str,
        config: &str,
    ) -> Result<SecretBundle, SecretsError> {
        let url = format!("{}/v3/configs/config/secrets", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("project", project), ("config", config)])
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SecretsError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SecretsError::ApiError { status, message });
        }

        let parsed: SecretsResponse = response
            .json()
            .await
            .map_err(|e| SecretsError::RequestFailed(e.to_string()))?;

        info!(
            "Fetched {} secrets from Doppler ({}/{})",
            parsed.secrets.len(),
            project,
            config
        );

        Ok(SecretBundle {
            project: project.to_string(),
            config: config.to_string(),
            secrets: parsed
                .secrets
                .into_iter()
                .filter_map(|(name, value)| value.computed.map(|v| (name, v)))
                .collect(),
        })
    }

    /// Fetch and resolve the three secrets the pipeline needs
    pub async fn pipeline_secrets(
        &self,
        project: &str,
        config: &str,
    ) -> Result<PipelineSecrets, SecretsError> {
        let bundle = self.secrets(project, config).await?;
        Ok(PipelineSecrets {
            ecr_repository_name: bundle.require(SECRET_ECR_REPOSITORY_NAME)?,
            aws_ecr_login_uri: bundle.require(SECRET_AWS_ECR_LOGIN_URI)?,
            aws_region: bundle.require(SECRET_AWS_REGION)?,
        })
    }
}

/// Computed secret values for one project/config pair
#[derive(Debug, Clone)]
pub struct SecretBundle {
    project: String,
    config: String,
    secrets: HashMap<String, String>,
}

impl SecretBundle {
    /// Look up a secret that must exist
    pub fn require(&self, name: &str) -> Result<String, SecretsError> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| SecretsError::MissingSecret {
                name: name.to_string(),
                project: self.project.clone(),
                config: self.config.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle_with(entries: &[(&str, &str)]) -> SecretBundle {
        SecretBundle {
            project: "tsa".to_string(),
            config: "prd".to_string(),
            secrets: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_require_present_secret() {
        let bundle = bundle_with(&[(SECRET_AWS_REGION, "us-east-1")]);
        assert_eq!(bundle.require(SECRET_AWS_REGION).unwrap(), "us-east-1");
    }

    #[test]
    fn test_require_missing_secret() {
        let bundle = bundle_with(&[]);
        let err = bundle.require(SECRET_ECR_REPOSITORY_NAME).unwrap_err();
        assert!(matches!(err, SecretsError::MissingSecret { .. }));
        assert!(err.to_string().contains("tsa/prd"));
    }

    #[test]
    fn test_image_reference() {
        let secrets = PipelineSecrets {
            ecr_repository_name: "tsa-scraper".to_string(),
            aws_ecr_login_uri: "123456789012.dkr.ecr.us-east-1.amazonaws.com".to_string(),
            aws_region: "us-east-1".to_string(),
        };
        assert_eq!(
            secrets.image("latest"),
            "123456789012.dkr.ecr.us-east-1.amazonaws.com/tsa-scraper:latest"
        );
    }

    #[test]
    fn test_secrets_response_parsing() {
        let body = r#"{
            "secrets": {
                "AWS_REGION": {"raw": "us-east-1", "computed": "us-east-1"},
                "EMPTY": {"raw": null, "computed": null}
            }
        }"#;
        let parsed: SecretsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.secrets.len(), 2);
        assert_eq!(
            parsed.secrets["AWS_REGION"].computed.as_deref(),
            Some("us-east-1")
        );
        assert!(parsed.secrets["EMPTY"].computed.is_none());
    }
}

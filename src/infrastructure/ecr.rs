//! ECR authorization
//!
//! Thin wrapper over the ECR GetAuthorizationToken API. The returned token
//! is decoded elsewhere; this module only talks to AWS.

use aws_config::Region;
use aws_sdk_ecr::Client;
use tracing::info;

use crate::error::RegistryError;

/// Client for fetching time-limited ECR authorization tokens
pub struct EcrAuthClient {
    client: Client,
}

/// One authorization entry as returned by ECR
#[derive(Debug, Clone)]
pub struct EcrAuthorization {
    /// Base64-encoded "username:password" token
    pub authorization_token: String,
    /// Registry endpoint, scheme included
    pub proxy_endpoint: String,
}

impl EcrAuthClient {
    /// Build a client against the given region, using the ambient AWS
    /// credential chain (env vars, profile, instance role).
    pub async fn connect(region: &str) -> Self {
        let shared = aws_config::from_env()
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self {
            client: Client::new(&shared),
        }
    }

    /// Fetch the current authorization token and proxy endpoint.
    ///
    /// ECR returns a list of authorization entries; the first one covers the
    /// account's default registry, which is all this pipeline uses.
    pub async fn authorization_token(&self) -> Result<EcrAuthorization, RegistryError> {
        let response = self
            .client
            .get_authorization_token()
            .send()
            .await
            .map_err(|e| RegistryError::ApiError(format!("get_authorization_token: {e}")))?;

        let data = response
            .authorization_data()
            .first()
            .ok_or(RegistryError::NoAuthorizationData)?;

        let authorization_token = data
            .authorization_token()
            .ok_or(RegistryError::NoAuthorizationData)?
            .to_string();

        let proxy_endpoint = data
            .proxy_endpoint()
            .ok_or(RegistryError::NoAuthorizationData)?
            .to_string();

        info!("Fetched ECR authorization token for {}", proxy_endpoint);

        Ok(EcrAuthorization {
            authorization_token,
            proxy_endpoint,
        })
    }
}

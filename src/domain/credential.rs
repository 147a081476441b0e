//! Registry credential decoding
//!
//! ECR authorization tokens are base64-encoded "username:password" pairs.
//! Decoding them is the only computation in the credential refresh path,
//! so it lives here where it can be tested without AWS.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::RegistryError;

/// A decoded username/password pair for registry authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
}

impl RegistryCredentials {
    /// Decode an ECR authorization token into credentials.
    ///
    /// The token must decode to UTF-8 text of the form "username:password"
    /// with both parts non-empty. The password may itself contain ':'
    /// characters, so only the first delimiter splits.
    pub fn from_authorization_token(token: &str) -> Result<Self, RegistryError> {
        let bytes = STANDARD
            .decode(token.trim())
            .map_err(|e| RegistryError::InvalidBase64(e.to_string()))?;

        let decoded = String::from_utf8(bytes).map_err(|_| RegistryError::InvalidUtf8)?;

        let (username, password) = decoded
            .split_once(':')
            .ok_or(RegistryError::MissingDelimiter)?;

        if username.is_empty() {
            return Err(RegistryError::EmptyCredential { part: "username" });
        }
        if password.is_empty() {
            return Err(RegistryError::EmptyCredential { part: "password" });
        }

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Extract the bare registry host from a proxy endpoint.
///
/// ECR reports the endpoint as "https://<account>.dkr.ecr.<region>.amazonaws.com";
/// the docker CLI wants it without the scheme.
pub fn registry_host(endpoint: &str) -> &str {
    endpoint
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
}

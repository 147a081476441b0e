//! Connection record - the one persisted entity
//!
//! Mirrors a workflow-engine connection entry: a named credential record
//! used by the container task to authenticate against the registry.

use serde::{Deserialize, Serialize};

use super::credential::RegistryCredentials;

/// A stored registry login, replaced wholesale on every refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Fixed identifier the container task looks up (e.g. "docker_ecr")
    pub conn_id: String,

    /// Connection type; always "docker" for registry logins
    pub conn_type: String,

    /// Registry endpoint as reported by ECR, scheme included
    pub host: String,

    /// Username half of the decoded authorization token
    pub login: String,

    /// Password half of the decoded authorization token
    pub password: String,
}

impl ConnectionRecord {
    /// Build a docker registry connection from freshly decoded credentials
    pub fn docker(
        conn_id: impl Into<String>,
        host: impl Into<String>,
        credentials: RegistryCredentials,
    ) -> Self {
        Self {
            conn_id: conn_id.into(),
            conn_type: "docker".to_string(),
            host: host.into(),
            login: credentials.username,
            password: credentials.password,
        }
    }

    /// Password masked for display
    pub fn masked_password(&self) -> String {
        "*".repeat(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docker_record_from_credentials() {
        let creds = RegistryCredentials {
            username: "AWS".to_string(),
            password: "token".to_string(),
        };
        let record = ConnectionRecord::docker("docker_ecr", "https://ecr.example.com", creds);
        assert_eq!(record.conn_id, "docker_ecr");
        assert_eq!(record.conn_type, "docker");
        assert_eq!(record.login, "AWS");
        assert_eq!(record.password, "token");
    }

    #[test]
    fn test_masked_password_hides_secret() {
        let creds = RegistryCredentials {
            username: "AWS".to_string(),
            password: "hunter2".to_string(),
        };
        let record = ConnectionRecord::docker("docker_ecr", "host", creds);
        assert!(!record.masked_password().contains("hunter2"));
    }
}

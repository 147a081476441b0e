//! Centralized error types for tsa-pipeline
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use thiserror::Error;

/// Top-level error type for pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Secrets error: {0}")]
    Secrets(#[from] SecretsError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Connection store error: {0}")]
    ConnectionStore(#[from] ConnectionStoreError),

    #[error("Docker error: {0}")]
    Docker(#[from] DockerError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Doppler secret store errors
#[derive(Error, Debug)]
pub enum SecretsError {
    #[error("DOPPLER_SERVICE_TOKEN not set. Export a Doppler service token before running")]
    TokenNotSet,

    #[error("Secret {name} not found in {project}/{config}")]
    MissingSecret {
        name: String,
        project: String,
        config: String,
    },

    #[error("Doppler API request failed: {0}")]
    RequestFailed(String),

    #[error("Doppler API returned {status}: {message}")]
    ApiError { status: u16, message: String },
}

/// Container registry authorization errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("ECR returned no authorization data")]
    NoAuthorizationData,

    #[error("Authorization token is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("Authorization token is not valid UTF-8")]
    InvalidUtf8,

    #[error("Authorization token is missing the ':' delimiter")]
    MissingDelimiter,

    #[error("Authorization token has an empty {part}")]
    EmptyCredential { part: &'static str },

    #[error("ECR API call failed: {0}")]
    ApiError(String),
}

/// Connection store errors
#[derive(Error, Debug)]
pub enum ConnectionStoreError {
    #[error("Connection {conn_id} not found. Run `tsa-pipeline refresh-credentials` first")]
    NotFound { conn_id: String },

    #[error("Failed to read connection store at {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("Failed to write connection store at {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("Connection store at {path} is corrupt: {message}")]
    Corrupt { path: String, message: String },
}

/// Docker invocation errors
#[derive(Error, Debug)]
pub enum DockerError {
    #[error("docker binary not found. Install Docker or set DOCKER_BIN")]
    BinaryNotFound,

    #[error("docker login to {registry} failed: {message}")]
    LoginFailed { registry: String, message: String },

    #[error("docker pull of {image} failed: {message}")]
    PullFailed { image: String, message: String },

    #[error("Container {name} exited with code {code:?}")]
    RunFailed { name: String, code: Option<i32> },

    #[error("Failed to execute docker: {0}")]
    ExecFailed(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required configuration missing: {field}")]
    MissingField { field: String },

    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },
}

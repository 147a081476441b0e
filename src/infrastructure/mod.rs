//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that interacts with external systems:
//! - Doppler secret store (HTTP API)
//! - ECR authorization (AWS SDK)
//! - Connection store (local JSON file)
//! - Docker CLI

pub mod connections;
pub mod docker;
pub mod doppler;
pub mod ecr;

// Re-export commonly used types
pub use connections::ConnectionStore;
pub use docker::{ContainerSpec, DockerClient};
pub use doppler::{DopplerClient, PipelineSecrets};
pub use ecr::{EcrAuthClient, EcrAuthorization};

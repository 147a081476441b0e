//! Docker CLI operations
//!
//! Drives the local docker binary for registry login, image pull, and the
//! one-shot scraper run. Container output streams straight through to the
//! operator's terminal.

use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ContainerSettings;
use crate::error::DockerError;

/// Everything needed to start one scraper container
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    /// Container name, unique per run
    pub name: String,
    /// Full image reference
    pub image: String,
    /// Shell the command runs under (invoked with -cx)
    pub shell: String,
    /// Command line executed inside the container
    pub command: String,
    /// CPU limit
    pub cpus: f64,
    /// Memory limit, docker-formatted
    pub memory: String,
    /// Docker network mode
    pub network: String,
    /// Environment variables forwarded into the container
    pub env: Vec<(String, String)>,
    /// Remove the container after a successful run
    pub auto_remove: bool,
}

impl ContainerSpec {
    /// Build a spec for one run from the configured settings
    pub fn from_settings(
        settings: &ContainerSettings,
        image: impl Into<String>,
        env: Vec<(String, String)>,
    ) -> Self {
        Self {
            name: format!("tsa-numbers-{}", Uuid::new_v4().simple()),
            image: image.into(),
            shell: settings.shell.clone(),
            command: settings.command.clone(),
            cpus: settings.cpus,
            memory: settings.memory.clone(),
            network: settings.network.clone(),
            env,
            auto_remove: settings.auto_remove,
        }
    }

    /// Arguments for `docker run`, image last before the in-container command
    fn run_args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--name".to_string(),
            self.name.clone(),
            "--network".to_string(),
            self.network.clone(),
            "--cpus".to_string(),
            self.cpus.to_string(),
            "--memory".to_string(),
            self.memory.clone(),
        ];
        for (key, value) in &self.env {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }
        args.push(self.image.clone());
        args.push(self.shell.clone());
        args.push("-cx".to_string());
        args.push(self.command.clone());
        args
    }
}

/// Client for docker CLI operations
pub struct DockerClient {
    binary: PathBuf,
}

impl DockerClient {
    /// Locate the docker binary (DOCKER_BIN overrides PATH lookup)
    pub fn discover() -> Result<Self, DockerError> {
        if let Ok(bin) = std::env::var("DOCKER_BIN") {
            if !bin.is_empty() {
                return Ok(Self {
                    binary: PathBuf::from(bin),
                });
            }
        }

        which::which("docker")
            .map(|binary| Self { binary })
            .map_err(|_| DockerError::BinaryNotFound)
    }

    /// Authenticate against a registry, password over stdin
    pub async fn login(
        &self,
        registry: &str,
        username: &str,
        password: &str,
    ) -> Result<(), DockerError> {
        let mut child = Command::new(&self.binary)
            .args(["login", registry, "--username", username, "--password-stdin"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DockerError::ExecFailed(e.to_string()))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DockerError::ExecFailed("stdin not captured".to_string()))?;
        stdin
            .write_all(password.as_bytes())
            .await
            .map_err(|e| DockerError::ExecFailed(e.to_string()))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| DockerError::ExecFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DockerError::LoginFailed {
                registry: registry.to_string(),
                message: stderr.trim().to_string(),
            });
        }

        info!("Logged in to {}", registry);
        Ok(())
    }

    /// Pull an image
    pub async fn pull(&self, image: &str) -> Result<(), DockerError> {
        let output = Command::new(&self.binary)
            .args(["pull", image])
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DockerError::ExecFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DockerError::PullFailed {
                image: image.to_string(),
                message: stderr.trim().to_string(),
            });
        }

        info!("Pulled {}", image);
        Ok(())
    }

    /// Run a container to completion, streaming its output.
    ///
    /// The container is removed after a zero exit when the spec asks for it,
    /// and left in place on failure so its logs stay inspectable.
    pub async fn run(&self, spec: &ContainerSpec) -> Result<(), DockerError> {
        info!("Starting container {} from {}", spec.name, spec.image);

        let status = Command::new(&self.binary)
            .args(spec.run_args())
            .status()
            .await
            .map_err(|e| DockerError::ExecFailed(e.to_string()))?;

        if !status.success() {
            return Err(DockerError::RunFailed {
                name: spec.name.clone(),
                code: status.code(),
            });
        }

        if spec.auto_remove {
            if let Err(e) = self.remove(&spec.name).await {
                warn!("Failed to remove container {} (non-fatal): {}", spec.name, e);
            }
        }

        Ok(())
    }

    /// Remove a stopped container
    pub async fn remove(&self, name: &str) -> Result<(), DockerError> {
        let output = Command::new(&self.binary)
            .args(["rm", name])
            .output()
            .await
            .map_err(|e| DockerError::ExecFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DockerError::ExecFailed(format!(
                "docker rm {}: {}",
                name,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

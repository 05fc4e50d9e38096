//! Docker CLI driver
//!
//! Drives the `docker` binary as a subprocess. Argument vectors are built
//! by pure functions and stderr is classified into `DriverError` variants
//! so callers see the taxonomy instead of raw exit codes. Diagnostics from
//! the toolchain are carried through verbatim in the error messages.

use crate::error::{DriverError, Result};
use crate::types::{BuildRequest, ContainerDriver, ImageBuilder, RemoveOutcome, RunSpec};
use async_trait::async_trait;
use std::process::Output;
use tokio::process::Command;

/// Default container CLI binary.
pub const DEFAULT_DOCKER_BINARY: &str = "docker";

/// Docker CLI implementation of the driver traits.
pub struct DockerCli {
    binary: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new(DEFAULT_DOCKER_BINARY)
    }
}

impl DockerCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn exec(&self, args: &[String]) -> Result<Output> {
        tracing::debug!("[DockerCli] Running: {} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DriverError::DaemonUnreachable(format!(
                        "{} binary not found in PATH",
                        self.binary
                    ))
                } else {
                    DriverError::Io(e)
                }
            })?;

        Ok(output)
    }

    fn command_failed(&self, args: &[String], output: &Output) -> DriverError {
        DriverError::CommandFailed {
            command: format!("{} {}", self.binary, args.join(" ")),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

#[async_trait]
impl ContainerDriver for DockerCli {
    async fn remove_container(&self, name: &str) -> Result<RemoveOutcome> {
        let args = rm_args(name);
        let output = self.exec(&args).await?;

        if output.status.success() {
            tracing::info!("[DockerCli] Removed container: {}", name);
            return Ok(RemoveOutcome::Removed);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_container_not_found(&stderr) {
            tracing::debug!("[DockerCli] Container not found on removal: {}", name);
            return Ok(RemoveOutcome::NotFound);
        }

        Err(classify_runtime_failure(&stderr)
            .unwrap_or_else(|| self.command_failed(&args, &output)))
    }

    async fn run_container(&self, spec: &RunSpec) -> Result<String> {
        let args = run_args(spec);
        let output = self.exec(&args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_run_failure(&stderr, spec)
                .unwrap_or_else(|| self.command_failed(&args, &output)));
        }

        // `docker run -d` prints the new container id on stdout.
        let container_id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        tracing::info!(
            "[DockerCli] Started container {} ({})",
            spec.name,
            container_id
        );
        Ok(container_id)
    }
}

#[async_trait]
impl ImageBuilder for DockerCli {
    async fn build(&self, request: &BuildRequest) -> Result<()> {
        let args = buildx_args(request);
        let output = self.exec(&args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_build_failure(&stderr)
                .unwrap_or_else(|| self.command_failed(&args, &output)));
        }

        tracing::info!(
            "[DockerCli] Built and pushed {} for {}",
            request.tag,
            request.platforms.join(", ")
        );
        Ok(())
    }
}

fn rm_args(name: &str) -> Vec<String> {
    vec!["rm".to_string(), "-f".to_string(), name.to_string()]
}

fn run_args(spec: &RunSpec) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "-d".to_string(),
        "--name".to_string(),
        spec.name.clone(),
    ];
    for (key, value) in &spec.env {
        args.push("-e".to_string());
        args.push(format!("{}={}", key, value));
    }
    for port in &spec.ports {
        args.push("-p".to_string());
        args.push(format!("{}:{}", port.host, port.container));
    }
    args.push(spec.image.clone());
    args
}

fn buildx_args(request: &BuildRequest) -> Vec<String> {
    vec![
        "buildx".to_string(),
        "build".to_string(),
        "--platform".to_string(),
        request.platforms.join(","),
        "--output".to_string(),
        format!("type=image,push={}", request.push),
        "--tag".to_string(),
        request.tag.clone(),
        request.context.display().to_string(),
    ]
}

fn is_container_not_found(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("no such container") || lower.contains("is not running")
}

/// Failures every docker invocation can hit, independent of subcommand.
fn classify_runtime_failure(stderr: &str) -> Option<DriverError> {
    let lower = stderr.to_lowercase();
    if lower.contains("cannot connect to the docker daemon")
        || lower.contains("docker daemon is not running")
        || lower.contains("error during connect")
    {
        return Some(DriverError::DaemonUnreachable(stderr.trim().to_string()));
    }
    if lower.contains("permission denied while trying to connect") {
        return Some(DriverError::DaemonUnreachable(stderr.trim().to_string()));
    }
    None
}

fn classify_run_failure(stderr: &str, spec: &RunSpec) -> Option<DriverError> {
    if let Some(e) = classify_runtime_failure(stderr) {
        return Some(e);
    }
    let lower = stderr.to_lowercase();
    if lower.contains("port is already allocated") || lower.contains("address already in use") {
        return Some(DriverError::PortInUse(stderr.trim().to_string()));
    }
    if lower.contains("is already in use by container") {
        return Some(DriverError::NameConflict(spec.name.clone()));
    }
    if lower.contains("unable to find image")
        || lower.contains("no such image")
        || lower.contains("pull access denied")
    {
        return Some(DriverError::ImageNotFound(spec.image.clone()));
    }
    None
}

fn classify_build_failure(stderr: &str) -> Option<DriverError> {
    if let Some(e) = classify_runtime_failure(stderr) {
        return Some(e);
    }
    let lower = stderr.to_lowercase();
    if lower.contains("unauthorized")
        || lower.contains("authentication required")
        || lower.contains("denied: requested access to the resource is denied")
    {
        return Some(DriverError::Unauthorized(stderr.trim().to_string()));
    }
    if lower.contains("buildx: unknown command")
        || lower.contains("is not a docker command")
        || lower.contains("no builder")
        || lower.contains("failed to find driver")
    {
        return Some(DriverError::BuilderUnavailable(stderr.trim().to_string()));
    }
    None
}

//! Driver-facing types and traits
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Host-to-container port publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    pub host: u16,
    pub container: u16,
}

/// Parameters for starting a detached container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub name: String,
    pub image: String,
    /// Environment variables, in insertion order.
    pub env: Vec<(String, String)>,
    pub ports: Vec<PortMapping>,
}

impl RunSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            env: Vec::new(),
            ports: Vec::new(),
        }
    }

    pub fn add_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn publish_port(mut self, host: u16, container: u16) -> Self {
        self.ports.push(PortMapping { host, container });
        self
    }
}

/// Result of a forced container removal.
///
/// A missing container is an outcome, not an error; the caller decides
/// whether it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// One multi-platform image build-and-push request.
///
/// A single invocation builds every listed platform and assembles one
/// manifest list; any per-platform failure fails the whole request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Full image reference, e.g. `viomck/dumbrouter:latest`.
    pub tag: String,
    /// Target platforms, e.g. `linux/arm64`, `linux/amd64`.
    pub platforms: Vec<String>,
    /// Build context directory.
    pub context: PathBuf,
    /// Push the manifest to the registry instead of loading it locally.
    pub push: bool,
}

/// Container lifecycle operations used by the fixture tooling.
#[async_trait]
pub trait ContainerDriver: Send + Sync {
    /// Forcibly remove a container by name. A container that does not
    /// exist maps to `Ok(RemoveOutcome::NotFound)`.
    async fn remove_container(&self, name: &str) -> Result<RemoveOutcome>;

    /// Start a detached container and return the runtime-assigned id.
    async fn run_container(&self, spec: &RunSpec) -> Result<String>;
}

/// Multi-platform image build operations used by the release tooling.
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    async fn build(&self, request: &BuildRequest) -> Result<()>;
}

//! Container runtime driver layer
//!
//! Provides the trait seams (`ContainerDriver`, `ImageBuilder`) that the
//! fixture and release tooling program against, plus the `DockerCli`
//! implementation that drives the `docker` binary. Callers inject the
//! driver so tests can substitute in-process fakes.

pub mod docker;
pub mod error;
pub mod types;

pub use docker::DockerCli;
pub use error::{DriverError, Result};
pub use types::{
    BuildRequest, ContainerDriver, ImageBuilder, PortMapping, RemoveOutcome, RunSpec,
};

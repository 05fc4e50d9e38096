//! Multi-architecture release pipeline for the router image
//!
//! Builds the router container image for a fixed set of platforms in one
//! toolchain invocation, pushes the combined manifest list to the
//! registry under a fixed tag, and verifies the pushed tag resolves for
//! every platform.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use config::ReleaseConfig;
pub use error::{ReleaseError, Result};
pub use pipeline::{PublishResult, ReleasePipeline};
pub use registry::{ManifestInspector, RegistryClient};

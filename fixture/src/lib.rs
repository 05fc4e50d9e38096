//! Fixture provisioning for router integration tests
//!
//! Stands up numbered, isolated HTTP dummy-server containers with
//! deterministic names and host ports. Provisioning is an idempotent
//! replace: any prior instance with the same id is removed first, so
//! repeated invocations converge to exactly one running container per id.

pub mod config;
pub mod provisioner;

pub use config::{FixtureConfig, INSTANCE_ENV_VAR};
pub use provisioner::{FixtureProvisioner, ProvisionError, RunningFixture};

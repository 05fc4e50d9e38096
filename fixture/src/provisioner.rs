//! Fixture provisioning (idempotent replace of numbered dummy-server containers)
use crate::config::{FixtureConfig, INSTANCE_ENV_VAR};
use driver::{ContainerDriver, DriverError, RemoveOutcome, RunSpec};
use std::sync::Arc;

/// Error type for fixture provisioning operations.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("Invalid instance id: {0}")]
    InvalidInstanceId(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

/// Handle to a provisioned, running fixture instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningFixture {
    pub instance_id: u32,
    pub container_name: String,
    pub host_port: u16,
    /// Runtime-assigned container id.
    pub container_id: String,
}

/// Provisions isolated dummy-server containers for router integration tests.
///
/// Each instance id maps to a deterministic container name and host port;
/// provisioning replaces any prior instance with the same id before
/// starting a fresh one, so repeated calls converge to one running
/// container per id.
pub struct FixtureProvisioner {
    driver: Arc<dyn ContainerDriver>,
    config: FixtureConfig,
}

impl FixtureProvisioner {
    pub fn new(
        driver: Arc<dyn ContainerDriver>,
        config: FixtureConfig,
    ) -> Result<Self, ProvisionError> {
        config.validate().map_err(ProvisionError::Config)?;
        Ok(Self { driver, config })
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    /// Provision the fixture instance for `token`.
    ///
    /// Removes any existing container with the derived name (a missing
    /// container is not an error), then starts a detached container from
    /// the fixture image with the instance id exposed as `NUMBER` and the
    /// derived host port published to the dummy server's port.
    ///
    /// Not safe to call concurrently with the same id: the remove-then-run
    /// sequence is not transactional. Distinct ids are independent.
    pub async fn provision(&self, token: &str) -> Result<RunningFixture, ProvisionError> {
        let id = self
            .config
            .parse_instance_id(token)
            .map_err(ProvisionError::InvalidInstanceId)?;
        let container_name = self.config.container_name(id);
        let host_port = self.config.host_port(id);

        match self.driver.remove_container(&container_name).await? {
            RemoveOutcome::Removed => {
                tracing::info!(
                    "[FixtureProvisioner] Replaced existing container: {}",
                    container_name
                );
            }
            RemoveOutcome::NotFound => {
                tracing::debug!(
                    "[FixtureProvisioner] No prior container to remove: {}",
                    container_name
                );
            }
        }

        let spec = RunSpec::new(&container_name, &self.config.image)
            .add_env(INSTANCE_ENV_VAR, id.to_string())
            .publish_port(host_port, self.config.container_port);

        let container_id = self.driver.run_container(&spec).await?;

        tracing::info!(
            "[FixtureProvisioner] Fixture {} running as {} on host port {}",
            id,
            container_name,
            host_port
        );

        Ok(RunningFixture {
            instance_id: id,
            container_name,
            host_port,
            container_id,
        })
    }

    /// Tear down the fixture instance for `token`.
    ///
    /// Idempotent: tearing down an instance that was never provisioned
    /// reports `NotFound` instead of failing.
    pub async fn teardown(&self, token: &str) -> Result<RemoveOutcome, ProvisionError> {
        let id = self
            .config
            .parse_instance_id(token)
            .map_err(ProvisionError::InvalidInstanceId)?;
        let container_name = self.config.container_name(id);
        let outcome = self.driver.remove_container(&container_name).await?;
        tracing::info!(
            "[FixtureProvisioner] Teardown of {}: {:?}",
            container_name,
            outcome
        );
        Ok(outcome)
    }
}

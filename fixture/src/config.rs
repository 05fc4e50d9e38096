//! Fixture configuration and derived naming/port scheme
use serde::{Deserialize, Serialize};
use std::path::Path;

// Constants for compiled-in defaults
/// Container name prefix for fixture instances
pub const DEFAULT_CONTAINER_PREFIX: &str = "http-dummyserver";

/// Pre-built dummy-server image; this tooling never builds or pulls it
pub const DEFAULT_FIXTURE_IMAGE: &str = "dummyserver:latest";

/// Host port base; the instance id occupies the trailing digits
pub const DEFAULT_PORT_BASE: u32 = 809;

/// Decimal digits reserved for the instance id in the host port
pub const DEFAULT_ID_WIDTH: u32 = 1;

/// Port the dummy server listens on inside the container
pub const DEFAULT_CONTAINER_PORT: u16 = 80;

/// Environment variable carrying the instance id into the container
pub const INSTANCE_ENV_VAR: &str = "NUMBER";

/// Environment variable naming an optional TOML config file
pub const CONFIG_PATH_ENV_VAR: &str = "FIXTURE_CONFIG";

/// Fixture provisioning configuration.
///
/// The host port for an instance is `port_base * 10^id_width + id`, an
/// explicit form of the "base literal with the id appended" convention.
/// `validate` rejects combinations whose derivable port range does not
/// fit in a `u16`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    pub container_prefix: String,
    pub image: String,
    pub port_base: u32,
    pub id_width: u32,
    pub container_port: u16,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            container_prefix: DEFAULT_CONTAINER_PREFIX.to_string(),
            image: DEFAULT_FIXTURE_IMAGE.to_string(),
            port_base: DEFAULT_PORT_BASE,
            id_width: DEFAULT_ID_WIDTH,
            container_port: DEFAULT_CONTAINER_PORT,
        }
    }
}

impl FixtureConfig {
    /// Load configuration from the file named by `FIXTURE_CONFIG`, or the
    /// compiled-in defaults when the variable is unset.
    pub fn load() -> Result<Self, String> {
        match std::env::var(CONFIG_PATH_ENV_VAR) {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {:?}: {}", path, e))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file {:?}: {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.container_prefix.is_empty() {
            return Err("container_prefix must not be empty".to_string());
        }
        if !self
            .container_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(format!(
                "container_prefix `{}` contains characters outside the container-name alphabet",
                self.container_prefix
            ));
        }
        if self.image.is_empty() {
            return Err("image must not be empty".to_string());
        }
        if self.id_width == 0 || self.id_width > 4 {
            return Err(format!(
                "id_width must be between 1 and 4, got {}",
                self.id_width
            ));
        }
        let span = 10u32.pow(self.id_width);
        let max_port = self.port_base as u64 * span as u64 + (span as u64 - 1);
        if self.port_base == 0 || max_port > u16::MAX as u64 {
            return Err(format!(
                "port_base {} with id_width {} derives ports up to {}, outside the valid range",
                self.port_base, self.id_width, max_port
            ));
        }
        Ok(())
    }

    /// Largest instance id representable under the configured width.
    pub fn max_instance_id(&self) -> u32 {
        10u32.pow(self.id_width) - 1
    }

    /// Parse and range-check an instance id token.
    ///
    /// The token must be the canonical decimal form of the id (no sign, no
    /// leading zeros) so that the name and port derivations agree.
    pub fn parse_instance_id(&self, token: &str) -> Result<u32, String> {
        let id: u32 = token
            .parse()
            .map_err(|_| format!("`{}` is not a decimal instance id", token))?;
        if token != id.to_string() {
            return Err(format!(
                "`{}` is not in canonical decimal form (got leading zeros?)",
                token
            ));
        }
        if id > self.max_instance_id() {
            return Err(format!(
                "instance id {} exceeds the configured maximum {}",
                id,
                self.max_instance_id()
            ));
        }
        Ok(id)
    }

    /// Deterministic container name for an instance.
    pub fn container_name(&self, id: u32) -> String {
        format!("{}-{}", self.container_prefix, id)
    }

    /// Deterministic host port for an instance.
    ///
    /// Collision-free for all ids accepted by `parse_instance_id`: distinct
    /// ids land on distinct ports.
    pub fn host_port(&self, id: u32) -> u16 {
        (self.port_base * 10u32.pow(self.id_width) + id) as u16
    }
}

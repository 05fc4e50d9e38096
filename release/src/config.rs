//! Release pipeline configuration
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Constants for compiled-in defaults
/// Image repository the router is published under
pub const DEFAULT_IMAGE_REPOSITORY: &str = "viomck/dumbrouter";

/// Published tag; overwritten on every release, last writer wins
pub const DEFAULT_IMAGE_TAG: &str = "latest";

/// Target platforms assembled into one manifest list
pub const DEFAULT_PLATFORMS: [&str; 2] = ["linux/arm64", "linux/amd64"];

/// Default Docker registry URL used for post-publish verification
pub const DEFAULT_REGISTRY_URL: &str = "https://registry-1.docker.io";

/// Environment variable naming an optional TOML config file
pub const CONFIG_PATH_ENV_VAR: &str = "RELEASE_CONFIG";

/// Release pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    pub repository: String,
    pub tag: String,
    pub platforms: Vec<String>,
    /// Build context directory; the current source tree.
    pub context: PathBuf,
    pub push: bool,
    /// Confirm the pushed manifest list covers every platform.
    pub verify: bool,
    pub registry_url: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            repository: DEFAULT_IMAGE_REPOSITORY.to_string(),
            tag: DEFAULT_IMAGE_TAG.to_string(),
            platforms: DEFAULT_PLATFORMS.iter().map(|p| p.to_string()).collect(),
            context: PathBuf::from("."),
            push: true,
            verify: true,
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
        }
    }
}

impl ReleaseConfig {
    /// Load configuration from the file named by `RELEASE_CONFIG`, or the
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
        if self.repository.is_empty() || self.repository.contains(char::is_whitespace) {
            return Err(format!("invalid repository `{}`", self.repository));
        }
        if self.tag.is_empty() {
            return Err("tag must not be empty".to_string());
        }
        if self.platforms.is_empty() {
            return Err("platform list must not be empty".to_string());
        }
        for platform in &self.platforms {
            if !platform.contains('/') {
                return Err(format!(
                    "platform `{}` is not of the form os/arch",
                    platform
                ));
            }
        }
        if self.registry_url.is_empty() {
            return Err("registry_url must not be empty".to_string());
        }
        Ok(())
    }

    /// Full image reference, e.g. `viomck/dumbrouter:latest`.
    pub fn reference(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }
}

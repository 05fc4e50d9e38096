//! Build-and-publish pipeline for the multi-arch router image
use crate::config::ReleaseConfig;
use crate::error::{ReleaseError, Result};
use crate::registry::ManifestInspector;
use driver::{BuildRequest, ImageBuilder};
use std::sync::Arc;

/// Outcome of one successful release run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    /// Published image reference, e.g. `viomck/dumbrouter:latest`.
    pub reference: String,
    /// Platforms covered by the pushed manifest list.
    pub platforms: Vec<String>,
    /// Whether the registry was queried to confirm per-platform coverage.
    pub verified: bool,
}

/// Single-shot release pipeline.
///
/// One linear, non-resumable operation: build the image for every
/// configured platform in a single toolchain invocation, push the
/// combined manifest list under the fixed tag, then optionally confirm
/// the registry resolves it for each platform. Any failure aborts the
/// whole run; re-running overwrites the tag (last writer wins).
pub struct ReleasePipeline {
    builder: Arc<dyn ImageBuilder>,
    inspector: Arc<dyn ManifestInspector>,
    config: ReleaseConfig,
}

impl ReleasePipeline {
    pub fn new(
        builder: Arc<dyn ImageBuilder>,
        inspector: Arc<dyn ManifestInspector>,
        config: ReleaseConfig,
    ) -> Result<Self> {
        config.validate().map_err(ReleaseError::Config)?;
        Ok(Self {
            builder,
            inspector,
            config,
        })
    }

    pub fn config(&self) -> &ReleaseConfig {
        &self.config
    }

    pub async fn build_and_publish(&self) -> Result<PublishResult> {
        let reference = self.config.reference();
        tracing::info!(
            "[ReleasePipeline] Building {} for {}",
            reference,
            self.config.platforms.join(", ")
        );

        let request = BuildRequest {
            tag: reference.clone(),
            platforms: self.config.platforms.clone(),
            context: self.config.context.clone(),
            push: self.config.push,
        };

        // One invocation for all platforms. A failure on any platform
        // fails the whole build and nothing is pushed.
        self.builder.build(&request).await?;

        let verified = if self.config.push && self.config.verify {
            self.verify_published(&reference).await?;
            true
        } else {
            false
        };

        tracing::info!("[ReleasePipeline] Published {}", reference);

        Ok(PublishResult {
            reference,
            platforms: self.config.platforms.clone(),
            verified,
        })
    }

    /// Confirm the pushed tag resolves to a manifest list covering every
    /// configured platform.
    async fn verify_published(&self, reference: &str) -> Result<()> {
        let published = self
            .inspector
            .platforms(&self.config.repository, &self.config.tag)
            .await?;

        for platform in &self.config.platforms {
            if !published.contains(platform) {
                return Err(ReleaseError::Verify(format!(
                    "{} is missing platform {} (registry reports: {})",
                    reference,
                    platform,
                    published.join(", ")
                )));
            }
        }

        tracing::info!(
            "[ReleasePipeline] Verified {} resolves for {}",
            reference,
            self.config.platforms.join(", ")
        );
        Ok(())
    }
}

//! Registry manifest inspection
//!
//! Minimal Docker Registry V2 client used to confirm that a pushed tag
//! resolves to a manifest list covering every requested platform.

use crate::error::{ReleaseError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Manifest Accept header for the registry API.
/// Manifest list types come first so multi-arch indexes are preferred
/// over single-platform manifests.
pub const MANIFEST_ACCEPT_HEADER: &str =
    "application/vnd.docker.distribution.manifest.list.v2+json, \
     application/vnd.oci.image.index.v1+json, \
     application/vnd.docker.distribution.manifest.v2+json, \
     application/vnd.oci.image.manifest.v1+json";

/// Read side of the registry, as seen by the release pipeline.
#[async_trait]
pub trait ManifestInspector: Send + Sync {
    /// Platforms (`os/arch`) referenced by the manifest list at
    /// `<repository>:<tag>`.
    async fn platforms(&self, repository: &str, tag: &str) -> Result<Vec<String>>;
}

/// HTTP client for registry manifest lookups.
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch an anonymous pull token from the endpoint named in a bearer
    /// challenge. Docker Hub issues these without credentials for public
    /// repositories.
    async fn fetch_token(&self, challenge: &BearerChallenge, repository: &str) -> Result<String> {
        let scope = format!("repository:{}:pull", repository);
        let response = self
            .client
            .get(&challenge.realm)
            .query(&[("service", challenge.service.as_str()), ("scope", &scope)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReleaseError::Unauthorized(format!(
                "token endpoint {} returned {}",
                challenge.realm,
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        body.get("token")
            .or_else(|| body.get("access_token"))
            .and_then(Value::as_str)
            .map(|t| t.to_string())
            .ok_or_else(|| {
                ReleaseError::Unauthorized("token endpoint returned no token".to_string())
            })
    }
}

#[async_trait]
impl ManifestInspector for RegistryClient {
    async fn platforms(&self, repository: &str, tag: &str) -> Result<Vec<String>> {
        let url = format!("{}/v2/{}/manifests/{}", self.base_url, repository, tag);
        tracing::debug!("[RegistryClient] Fetching manifest: {}", url);

        let mut response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, MANIFEST_ACCEPT_HEADER)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            let challenge = response
                .headers()
                .get(reqwest::header::WWW_AUTHENTICATE)
                .and_then(|h| h.to_str().ok())
                .and_then(parse_bearer_challenge)
                .ok_or_else(|| {
                    ReleaseError::Unauthorized(format!(
                        "registry returned 401 without a usable bearer challenge for {}",
                        url
                    ))
                })?;

            let token = self.fetch_token(&challenge, repository).await?;
            response = self
                .client
                .get(&url)
                .header(reqwest::header::ACCEPT, MANIFEST_ACCEPT_HEADER)
                .bearer_auth(token)
                .send()
                .await?;
        }

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ReleaseError::Unauthorized(format!(
                "registry refused manifest access for {}: {}",
                url, status
            )));
        }
        if !status.is_success() {
            return Err(ReleaseError::Verify(format!(
                "manifest fetch for {} returned {}",
                url, status
            )));
        }

        let manifest: Value = response.json().await?;
        parse_manifest_platforms(&manifest).map_err(ReleaseError::Verify)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BearerChallenge {
    realm: String,
    service: String,
}

/// Parse a `WWW-Authenticate: Bearer realm="...",service="..."` header.
fn parse_bearer_challenge(header: &str) -> Option<BearerChallenge> {
    let params = header.strip_prefix("Bearer ")?;
    let mut realm = None;
    let mut service = None;
    for param in params.split(',') {
        let (key, value) = param.trim().split_once('=')?;
        let value = value.trim_matches('"');
        match key {
            "realm" => realm = Some(value.to_string()),
            "service" => service = Some(value.to_string()),
            _ => {}
        }
    }
    Some(BearerChallenge {
        realm: realm?,
        service: service?,
    })
}

/// Extract `os/arch` entries from a manifest list or OCI image index.
fn parse_manifest_platforms(manifest: &Value) -> std::result::Result<Vec<String>, String> {
    let manifests = manifest
        .get("manifests")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            format!(
                "not a multi-platform manifest (mediaType: {})",
                manifest
                    .get("mediaType")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
            )
        })?;

    let mut platforms = Vec::new();
    for entry in manifests {
        let platform = &entry["platform"];
        let os = platform["os"].as_str().unwrap_or("unknown");
        // Attestation manifests carry os "unknown"; skip them.
        if os == "unknown" {
            continue;
        }
        let arch = platform["architecture"].as_str().unwrap_or("unknown");
        platforms.push(format!("{}/{}", os, arch));
    }
    Ok(platforms)
}

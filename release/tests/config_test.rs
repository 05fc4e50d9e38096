//! Unit tests for release configuration
//!
//! Tests for compiled-in defaults, TOML loading, and validation.

use release::config::{
    ReleaseConfig, DEFAULT_IMAGE_REPOSITORY, DEFAULT_IMAGE_TAG, DEFAULT_PLATFORMS,
    DEFAULT_REGISTRY_URL,
};
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_defaults_match_constants() {
    let config = ReleaseConfig::default();
    assert_eq!(config.repository, DEFAULT_IMAGE_REPOSITORY);
    assert_eq!(config.tag, DEFAULT_IMAGE_TAG);
    assert_eq!(config.platforms, DEFAULT_PLATFORMS);
    assert_eq!(config.context, PathBuf::from("."));
    assert!(config.push);
    assert!(config.verify);
    assert_eq!(config.registry_url, DEFAULT_REGISTRY_URL);
    assert!(config.validate().is_ok());
}

#[test]
fn test_reference() {
    assert_eq!(
        ReleaseConfig::default().reference(),
        "viomck/dumbrouter:latest"
    );
}

#[test]
fn test_config_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
repository = "example/dumbrouter"
platforms = ["linux/amd64"]
verify = false
"#
    )
    .unwrap();

    let config = ReleaseConfig::from_file(file.path()).unwrap();
    assert_eq!(config.repository, "example/dumbrouter");
    assert_eq!(config.platforms, ["linux/amd64"]);
    assert!(!config.verify);
    // Unspecified fields keep their defaults.
    assert_eq!(config.tag, "latest");
    assert!(config.push);
}

#[test]
fn test_empty_platform_list_rejected() {
    let config = ReleaseConfig {
        platforms: Vec::new(),
        ..ReleaseConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_malformed_platform_rejected() {
    let config = ReleaseConfig {
        platforms: vec!["arm64".to_string()],
        ..ReleaseConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_repository_rejected() {
    for repository in ["", "has space"] {
        let config = ReleaseConfig {
            repository: repository.to_string(),
            ..ReleaseConfig::default()
        };
        assert!(
            config.validate().is_err(),
            "repository `{}` should be rejected",
            repository
        );
    }
}

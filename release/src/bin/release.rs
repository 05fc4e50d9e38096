//! release binary: build and publish the multi-arch router image.
//!
//! Takes no arguments; every parameter is a compiled-in constant, with an
//! optional TOML override named by `RELEASE_CONFIG`. Exit code reflects
//! the toolchain's own success or failure.

use clap::Parser;
use driver::DockerCli;
use release::{RegistryClient, ReleaseConfig, ReleasePipeline};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "release",
    version,
    about = "Build and push the multi-architecture router image"
)]
struct Args {}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let _args = Args::parse();

    let config = match ReleaseConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let registry = match RegistryClient::new(&config.registry_url) {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let pipeline = match ReleasePipeline::new(Arc::new(DockerCli::default()), registry, config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    match pipeline.build_and_publish().await {
        Ok(result) => {
            println!(
                "published {} for {}{}",
                result.reference,
                result.platforms.join(", "),
                if result.verified { " (verified)" } else { "" }
            );
        }
        Err(e) => {
            tracing::error!("Release failed: {}", e);
            std::process::exit(1);
        }
    }
}

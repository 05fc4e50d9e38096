//! fixture binary: provision a numbered dummy-server container.
//!
//! Exit code 0 when the fixture is running; non-zero on any fatal error.
//! A missing prior container is part of normal operation and never fails
//! the run.

use clap::Parser;
use driver::DockerCli;
use fixture::{FixtureConfig, FixtureProvisioner};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "fixture",
    version,
    about = "Provision an isolated HTTP dummy-server container for router tests"
)]
struct Args {
    /// Instance id; multiple values are concatenated into one token
    #[arg(required = true)]
    instance_id: Vec<String>,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();
    let token = args.instance_id.concat();

    let config = match FixtureConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let provisioner = match FixtureProvisioner::new(Arc::new(DockerCli::default()), config) {
        Ok(provisioner) => provisioner,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    match provisioner.provision(&token).await {
        Ok(handle) => {
            println!(
                "{} running on host port {} ({})",
                handle.container_name, handle.host_port, handle.container_id
            );
        }
        Err(e) => {
            tracing::error!("Failed to provision fixture {}: {}", token, e);
            std::process::exit(1);
        }
    }
}

//! Lifecycle tests for fixture provisioning.
//!
//! Run against an in-process fake driver so no container runtime is
//! needed: the fake records every call and keeps a running-container map,
//! which lets these tests assert idempotent replace, masking of missing
//! removals, and propagation of fatal driver errors.

use async_trait::async_trait;
use driver::{ContainerDriver, DriverError, RemoveOutcome, RunSpec};
use fixture::{FixtureConfig, FixtureProvisioner, INSTANCE_ENV_VAR};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Remove(String),
    Run(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunFailure {
    PortInUse,
    ImageMissing,
    DaemonDown,
}

#[derive(Default)]
struct FakeState {
    running: HashMap<String, RunSpec>,
    calls: Vec<Call>,
    next_id: u32,
    run_failure: Option<RunFailure>,
}

#[derive(Default)]
struct FakeDriver {
    state: Mutex<FakeState>,
}

impl FakeDriver {
    fn with_run_failure(failure: RunFailure) -> Self {
        let driver = Self::default();
        driver.state.lock().unwrap().run_failure = Some(failure);
        driver
    }

    fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    fn running(&self) -> HashMap<String, RunSpec> {
        self.state.lock().unwrap().running.clone()
    }
}

#[async_trait]
impl ContainerDriver for FakeDriver {
    async fn remove_container(&self, name: &str) -> driver::Result<RemoveOutcome> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Remove(name.to_string()));
        if state.running.remove(name).is_some() {
            Ok(RemoveOutcome::Removed)
        } else {
            Ok(RemoveOutcome::NotFound)
        }
    }

    async fn run_container(&self, spec: &RunSpec) -> driver::Result<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Run(spec.name.clone()));
        match state.run_failure {
            Some(RunFailure::PortInUse) => {
                return Err(DriverError::PortInUse("port is already allocated".to_string()))
            }
            Some(RunFailure::ImageMissing) => {
                return Err(DriverError::ImageNotFound(spec.image.clone()))
            }
            Some(RunFailure::DaemonDown) => {
                return Err(DriverError::DaemonUnreachable(
                    "Cannot connect to the Docker daemon".to_string(),
                ))
            }
            None => {}
        }
        if state.running.contains_key(&spec.name) {
            return Err(DriverError::NameConflict(spec.name.clone()));
        }
        state.running.insert(spec.name.clone(), spec.clone());
        state.next_id += 1;
        Ok(format!("container-{}", state.next_id))
    }
}

fn provisioner(driver: Arc<FakeDriver>) -> FixtureProvisioner {
    FixtureProvisioner::new(driver, FixtureConfig::default()).unwrap()
}

#[tokio::test]
async fn test_provision_derives_name_env_and_port() {
    let driver = Arc::new(FakeDriver::default());
    let handle = provisioner(driver.clone()).provision("3").await.unwrap();

    assert_eq!(handle.instance_id, 3);
    assert_eq!(handle.container_name, "http-dummyserver-3");
    assert_eq!(handle.host_port, 8093);
    assert_eq!(handle.container_id, "container-1");

    let running = driver.running();
    let spec = running.get("http-dummyserver-3").unwrap();
    assert_eq!(spec.image, "dummyserver:latest");
    assert_eq!(
        spec.env,
        vec![(INSTANCE_ENV_VAR.to_string(), "3".to_string())]
    );
    assert_eq!(spec.ports.len(), 1);
    assert_eq!(spec.ports[0].host, 8093);
    assert_eq!(spec.ports[0].container, 80);
}

#[tokio::test]
async fn test_provision_issues_remove_before_run() {
    let driver = Arc::new(FakeDriver::default());
    provisioner(driver.clone()).provision("7").await.unwrap();

    assert_eq!(
        driver.calls(),
        vec![
            Call::Remove("http-dummyserver-7".to_string()),
            Call::Run("http-dummyserver-7".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_missing_prior_container_does_not_fail() {
    // First-ever provisioning: the removal hits nothing and must be masked.
    let driver = Arc::new(FakeDriver::default());
    let result = provisioner(driver).provision("5").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_provision_twice_leaves_one_running_container() {
    let driver = Arc::new(FakeDriver::default());
    let p = provisioner(driver.clone());

    let first = p.provision("3").await.unwrap();
    let second = p.provision("3").await.unwrap();

    let running = driver.running();
    assert_eq!(running.len(), 1);
    assert!(running.contains_key("http-dummyserver-3"));
    // The replacement is a fresh container, not the survivor of the first call.
    assert_ne!(first.container_id, second.container_id);
}

#[tokio::test]
async fn test_distinct_ids_are_independent() {
    let driver = Arc::new(FakeDriver::default());
    let p = provisioner(driver.clone());

    let a = p.provision("1").await.unwrap();
    let b = p.provision("2").await.unwrap();

    assert_ne!(a.container_name, b.container_name);
    assert_ne!(a.host_port, b.host_port);
    assert_eq!(driver.running().len(), 2);
}

#[tokio::test]
async fn test_port_collision_propagates() {
    let driver = Arc::new(FakeDriver::with_run_failure(RunFailure::PortInUse));
    let err = provisioner(driver).provision("3").await.unwrap_err();
    assert!(matches!(
        err,
        fixture::ProvisionError::Driver(DriverError::PortInUse(_))
    ));
}

#[tokio::test]
async fn test_missing_image_propagates() {
    let driver = Arc::new(FakeDriver::with_run_failure(RunFailure::ImageMissing));
    let err = provisioner(driver).provision("3").await.unwrap_err();
    assert!(matches!(
        err,
        fixture::ProvisionError::Driver(DriverError::ImageNotFound(_))
    ));
}

#[tokio::test]
async fn test_unreachable_daemon_propagates() {
    let driver = Arc::new(FakeDriver::with_run_failure(RunFailure::DaemonDown));
    let err = provisioner(driver).provision("3").await.unwrap_err();
    assert!(matches!(
        err,
        fixture::ProvisionError::Driver(DriverError::DaemonUnreachable(_))
    ));
}

#[tokio::test]
async fn test_invalid_instance_ids_rejected_at_boundary() {
    let driver = Arc::new(FakeDriver::default());
    let p = provisioner(driver.clone());

    for token in ["", "x", "-1", "03", "12", "4294967296"] {
        let err = p.provision(token).await.unwrap_err();
        assert!(
            matches!(err, fixture::ProvisionError::InvalidInstanceId(_)),
            "token `{}` should be rejected",
            token
        );
    }
    // Nothing was touched for invalid input.
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn test_teardown_removes_running_fixture() {
    let driver = Arc::new(FakeDriver::default());
    let p = provisioner(driver.clone());

    p.provision("4").await.unwrap();
    let outcome = p.teardown("4").await.unwrap();
    assert_eq!(outcome, RemoveOutcome::Removed);
    assert!(driver.running().is_empty());
}

#[tokio::test]
async fn test_teardown_of_unknown_fixture_is_idempotent() {
    let driver = Arc::new(FakeDriver::default());
    let outcome = provisioner(driver).teardown("9").await.unwrap();
    assert_eq!(outcome, RemoveOutcome::NotFound);
}

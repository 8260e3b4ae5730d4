//! Shared test helpers

use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use liquidai_cli::config::env::StackEnv;
use liquidai_cli::config::store::ConfigStore;
use liquidai_cli::errors::CliError;
use liquidai_cli::runtime::{ContainerRuntime, ContainerSpec, ContainerSummary};
use liquidai_cli::storage::layout::ProjectLayout;

/// A project directory that is removed when dropped
pub struct Project {
    pub dir: TempDir,
    pub store: ConfigStore,
}

impl Project {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(ProjectLayout::new(dir.path()));
        Self { dir, store }
    }

    pub fn layout(&self) -> &ProjectLayout {
        self.store.layout()
    }

    pub fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.dir.path().join(name), contents).unwrap();
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).unwrap()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }
}

/// Runtime that records calls instead of running docker
#[derive(Default)]
pub struct FakeRuntime {
    /// Operations that should fail, matched against the call name
    pub failing: Vec<&'static str>,
    pub existing_containers: Vec<String>,
    pub calls: Mutex<Vec<String>>,
    pub compose_envs: Mutex<Vec<StackEnv>>,
    pub started: Mutex<Vec<ContainerSpec>>,
}

impl FakeRuntime {
    pub fn failing(ops: &[&'static str]) -> Self {
        Self {
            failing: ops.to_vec(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_compose_env(&self) -> Option<StackEnv> {
        self.compose_envs.lock().unwrap().last().cloned()
    }

    pub fn started(&self) -> Vec<ContainerSpec> {
        self.started.lock().unwrap().clone()
    }

    fn call(&self, op: &'static str, detail: &str) -> Result<(), CliError> {
        let entry = if detail.is_empty() {
            op.to_string()
        } else {
            format!("{} {}", op, detail)
        };
        self.calls.lock().unwrap().push(entry);

        if self.failing.contains(&op) {
            return Err(CliError::Docker(format!("{} failed", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn check_available(&self) -> Result<(), CliError> {
        self.call("info", "")
            .map_err(|e| CliError::RuntimeUnavailable(e.to_string()))
    }

    async fn compose_up(&self, env: &StackEnv) -> Result<(), CliError> {
        self.compose_envs.lock().unwrap().push(env.clone());
        self.call("compose_up", "")
    }

    async fn compose_down(&self, env: &StackEnv) -> Result<(), CliError> {
        self.compose_envs.lock().unwrap().push(env.clone());
        self.call("compose_down", "")
    }

    async fn ensure_volume(&self, name: &str) -> Result<bool, CliError> {
        self.call("ensure_volume", name).map(|_| true)
    }

    async fn remove_volume(&self, name: &str) -> Result<(), CliError> {
        self.call("remove_volume", name)
    }

    async fn remove_network(&self, name: &str) -> Result<(), CliError> {
        self.call("remove_network", name)
    }

    async fn remove_container(&self, name: &str) -> Result<bool, CliError> {
        self.call("remove_container", name)?;
        Ok(self.existing_containers.iter().any(|c| c == name))
    }

    async fn list_containers(&self, ancestor: &str) -> Result<Vec<ContainerSummary>, CliError> {
        self.call("list_containers", ancestor)?;
        Ok(self
            .existing_containers
            .iter()
            .map(|name| ContainerSummary {
                name: name.clone(),
                host_port: None,
            })
            .collect())
    }

    async fn run_container(&self, spec: &ContainerSpec) -> Result<(), CliError> {
        self.call("run_container", &spec.name)?;
        self.started.lock().unwrap().push(spec.clone());
        Ok(())
    }
}

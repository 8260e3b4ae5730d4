//! Container runtime driver

pub mod docker;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::config::env::StackEnv;
use crate::errors::CliError;

/// Port the model server listens on inside its container
pub const MODEL_CONTAINER_PORT: u16 = 8000;

/// Operations the commands need from a container runtime.
///
/// Every call runs to completion before returning. Failures are returned as
/// is; nothing is retried.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Fail unless the engine is reachable
    async fn check_available(&self) -> Result<(), CliError>;

    /// Start the stack and wait for it to become healthy
    async fn compose_up(&self, env: &StackEnv) -> Result<(), CliError>;

    /// Stop the stack, keeping volumes
    async fn compose_down(&self, env: &StackEnv) -> Result<(), CliError>;

    /// Create a named volume unless it already exists. Returns whether it was created.
    async fn ensure_volume(&self, name: &str) -> Result<bool, CliError>;

    async fn remove_volume(&self, name: &str) -> Result<(), CliError>;

    async fn remove_network(&self, name: &str) -> Result<(), CliError>;

    /// Force-remove a container if one with this exact name exists.
    /// Returns whether a container was removed.
    async fn remove_container(&self, name: &str) -> Result<bool, CliError>;

    /// Running containers created from `ancestor`
    async fn list_containers(&self, ancestor: &str) -> Result<Vec<ContainerSummary>, CliError>;

    /// Start a detached container. A container with the same name must not exist.
    async fn run_container(&self, spec: &ContainerSpec) -> Result<(), CliError>;
}

/// A detached container to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub image: String,
    pub name: String,

    /// Host port published for [`MODEL_CONTAINER_PORT`]
    pub host_port: u16,

    /// Value for `--gpus`, e.g. `all` or `device=1`
    pub gpus: String,

    /// Environment for the container; values are never put on the command line
    pub env: Vec<(String, String)>,
    pub volumes: Vec<VolumeMount>,

    /// Health check command run inside the container
    pub health_cmd: Option<String>,
    pub health_interval_secs: u32,

    /// Arguments appended after the image
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    pub host_path: PathBuf,
    pub container_path: String,
    pub read_only: bool,
}

impl VolumeMount {
    /// `host:container[:ro]` as accepted by `docker run -v`
    pub fn to_arg(&self) -> String {
        let mut arg = format!("{}:{}", self.host_path.display(), self.container_path);
        if self.read_only {
            arg.push_str(":ro");
        }
        arg
    }
}

impl ContainerSpec {
    /// Arguments for `docker run`, starting with `run -d`
    pub fn to_run_args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.name.clone(),
            "-p".to_string(),
            format!("{}:{}", self.host_port, MODEL_CONTAINER_PORT),
            "--gpus".to_string(),
            self.gpus.clone(),
        ];
        // `-e KEY` takes the value from the docker client's environment
        for (key, _) in &self.env {
            args.push("-e".to_string());
            args.push(key.clone());
        }
        for volume in &self.volumes {
            args.push("-v".to_string());
            args.push(volume.to_arg());
        }
        if let Some(cmd) = &self.health_cmd {
            args.push("--health-cmd".to_string());
            args.push(cmd.clone());
            args.push("--health-interval".to_string());
            args.push(format!("{}s", self.health_interval_secs));
        }
        args.push(self.image.clone());
        args.extend(self.args.iter().cloned());
        args
    }
}

/// A running container as reported by the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub name: String,

    /// Host port published for the model port, if any
    pub host_port: Option<u16>,
}

/// Parse `{{.Names}}\t{{.Ports}}` lines from `docker ps`
pub fn parse_container_listing(listing: &str) -> Vec<ContainerSummary> {
    listing
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let (name, ports) = line.split_once('\t').unwrap_or((line, ""));
            ContainerSummary {
                name: name.trim().to_string(),
                host_port: published_port(ports, MODEL_CONTAINER_PORT),
            }
        })
        .collect()
}

/// Find the host port mapped to `container_port/tcp` in a `docker ps` ports column,
/// e.g. `0.0.0.0:9000->8000/tcp, :::9000->8000/tcp`
fn published_port(ports: &str, container_port: u16) -> Option<u16> {
    let target = format!("->{}/tcp", container_port);
    ports
        .split(',')
        .map(str::trim)
        .find_map(|mapping| mapping.strip_suffix(target.as_str()))
        .and_then(|host| host.rsplit(':').next())
        .and_then(|port| port.parse().ok())
}

//! Docker CLI runtime

use std::path::PathBuf;
use std::process::{Output, Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::env::StackEnv;
use crate::errors::CliError;
use crate::runtime::{parse_container_listing, ContainerRuntime, ContainerSpec, ContainerSummary};

/// Drives the `docker` binary, one process per call
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
    project_dir: PathBuf,
    compose_file: Option<PathBuf>,
}

impl DockerCli {
    pub fn new(binary: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            project_dir: project_dir.into(),
            compose_file: None,
        }
    }

    /// Pass `-f <file>` to every compose invocation
    pub fn with_compose_file(mut self, compose_file: Option<PathBuf>) -> Self {
        self.compose_file = compose_file;
        self
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut command = Command::new(&self.binary);
        command
            .current_dir(&self.project_dir)
            .args(args)
            .stdin(Stdio::null());
        command
    }

    fn compose(&self, env: &StackEnv, args: &[&str]) -> Command {
        let mut command = self.command(["compose"]);
        if let Some(file) = &self.compose_file {
            command.arg("-f").arg(file);
        }
        command.args(args);
        env.apply(&mut command);
        command
    }

    /// Run quietly, reporting only whether the exit status was zero
    async fn succeeds(&self, args: &[&str]) -> Result<bool, CliError> {
        debug!("Running {} {}", self.binary, args.join(" "));
        let status = self
            .command(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| self.spawn_error(args, e))?;
        Ok(status.success())
    }

    async fn capture(&self, mut command: Command, args: &[&str]) -> Result<Output, CliError> {
        debug!("Running {} {}", self.binary, args.join(" "));
        command
            .output()
            .await
            .map_err(|e| self.spawn_error(args, e))
    }

    /// Like [`Self::succeeds`], but a non-zero exit is a [`CliError::Docker`]
    async fn run(&self, args: &[&str]) -> Result<(), CliError> {
        self.run_command(self.command(args), args).await
    }

    async fn run_command(&self, command: Command, args: &[&str]) -> Result<(), CliError> {
        let output = self.capture(command, args).await?;
        if !output.status.success() {
            return Err(CliError::Docker(format!(
                "{} {} failed: {}",
                self.binary,
                args.join(" "),
                combined_output(&output).trim()
            )));
        }
        Ok(())
    }

    async fn run_compose(&self, env: &StackEnv, args: &[&str]) -> Result<(), CliError> {
        let output = self.capture(self.compose(env, args), args).await?;
        if !output.status.success() {
            return Err(CliError::Compose {
                action: args.first().copied().unwrap_or_default().to_string(),
                output: combined_output(&output),
            });
        }
        Ok(())
    }

    fn spawn_error(&self, args: &[&str], e: std::io::Error) -> CliError {
        CliError::Docker(format!(
            "failed to run {} {}: {}",
            self.binary,
            args.join(" "),
            e
        ))
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn check_available(&self) -> Result<(), CliError> {
        match self.succeeds(&["info"]).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::RuntimeUnavailable(
                "docker daemon is not running".to_string(),
            )),
            Err(e) => Err(CliError::RuntimeUnavailable(e.to_string())),
        }
    }

    async fn compose_up(&self, env: &StackEnv) -> Result<(), CliError> {
        info!("Starting the compose stack");
        self.run_compose(env, &["up", "-d", "--wait"]).await
    }

    async fn compose_down(&self, env: &StackEnv) -> Result<(), CliError> {
        info!("Stopping the compose stack");
        self.run_compose(env, &["down"]).await
    }

    async fn ensure_volume(&self, name: &str) -> Result<bool, CliError> {
        if self.succeeds(&["volume", "inspect", name]).await? {
            debug!("Volume {} already exists", name);
            return Ok(false);
        }

        info!("Creating volume {}", name);
        self.run(&["volume", "create", name]).await?;
        Ok(true)
    }

    async fn remove_volume(&self, name: &str) -> Result<(), CliError> {
        self.run(&["volume", "rm", name]).await
    }

    async fn remove_network(&self, name: &str) -> Result<(), CliError> {
        self.run(&["network", "rm", name]).await
    }

    async fn remove_container(&self, name: &str) -> Result<bool, CliError> {
        let args = ["ps", "-a", "--format", "{{.Names}}"];
        let output = self.capture(self.command(args), &args).await?;
        if !output.status.success() {
            return Err(CliError::Docker(format!(
                "failed to list containers: {}",
                combined_output(&output).trim()
            )));
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        if !listing.lines().any(|line| line.trim() == name) {
            debug!("Container {} not found", name);
            return Ok(false);
        }

        info!("Removing container {}", name);
        self.run(&["rm", "-f", name]).await?;
        Ok(true)
    }

    async fn list_containers(&self, ancestor: &str) -> Result<Vec<ContainerSummary>, CliError> {
        let filter = format!("ancestor={}", ancestor);
        let args = ["ps", "--filter", filter.as_str(), "--format", "{{.Names}}\t{{.Ports}}"];
        let output = self.capture(self.command(args), &args).await?;
        if !output.status.success() {
            return Err(CliError::Docker(format!(
                "failed to list containers: {}",
                combined_output(&output).trim()
            )));
        }

        Ok(parse_container_listing(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    async fn run_container(&self, spec: &ContainerSpec) -> Result<(), CliError> {
        info!("Starting container {} from {}", spec.name, spec.image);
        let args = spec.to_run_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        // values travel in the child environment so they stay out of argv and logs
        let mut command = self.command(&args);
        command.envs(spec.env.iter().map(|(key, value)| (key, value)));
        self.run_command(command, &args).await
    }
}

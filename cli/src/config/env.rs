//! Environment projection for the compose stack
//!
//! `docker compose` reads the stack settings from environment variables. The
//! projection is handed to the runtime driver and injected into the spawned
//! process only; the CLI's own environment is never modified.

use tokio::process::Command;

use crate::config::model::{DeploymentConfig, Field};

/// Ordered `NAME=value` table derived from a [`DeploymentConfig`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackEnv {
    vars: Vec<(&'static str, String)>,
}

impl StackEnv {
    /// Project every config field onto its environment variable
    pub fn from_config(config: &DeploymentConfig) -> Self {
        let vars = Field::ALL
            .into_iter()
            .map(|field| (field.env_name(), config.value(field)))
            .collect();

        Self { vars }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.vars.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Inject the variables into a child process
    pub fn apply(&self, command: &mut Command) {
        command.envs(self.iter());
    }

    /// Render as `KEY=VALUE` lines
    pub fn to_dotenv(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}\n", k, v))
            .collect()
    }
}

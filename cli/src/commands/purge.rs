//! `purge`: remove every stack component

use std::io::BufRead;

use colored::Colorize;
use tracing::warn;

use crate::commands::prompt;
use crate::commands::{POSTGRES_VOLUME, STACK_NETWORK};
use crate::config::env::StackEnv;
use crate::config::store::ConfigStore;
use crate::errors::CliError;
use crate::runtime::ContainerRuntime;

/// Outcome of a best-effort purge
#[derive(Debug, Clone, Default)]
pub struct PurgeReport {
    /// One entry per step that failed
    pub warnings: Vec<String>,
}

impl PurgeReport {
    fn record(&mut self, step: &str, result: Result<(), CliError>) {
        if let Err(e) = result {
            warn!("{} failed: {}", step, e);
            println!("{} {}: {}", "Warning:".yellow(), step, e);
            self.warnings.push(format!("{}: {}", step, e));
        }
    }
}

/// Tear down the stack and delete its data and configuration.
///
/// Every step runs even if an earlier one fails; failures are collected as
/// warnings. The `.env.bak` archive is left in place.
pub async fn purge(store: &ConfigStore, runtime: &dyn ContainerRuntime) -> PurgeReport {
    let mut report = PurgeReport::default();

    // Without a readable config compose still gets to try with an empty projection
    let env = match store.load_existing().await {
        Ok(config) => StackEnv::from_config(&config),
        Err(e) => {
            report.record("Reading configuration", Err(e));
            StackEnv::default()
        }
    };

    println!("Shutting down containers...");
    report.record("Stopping containers", runtime.compose_down(&env).await);

    println!("Removing {} volume...", POSTGRES_VOLUME);
    report.record(
        &format!("Removing {} volume", POSTGRES_VOLUME),
        runtime.remove_volume(POSTGRES_VOLUME).await,
    );

    println!("Removing {}...", STACK_NETWORK);
    report.record(
        &format!("Removing {}", STACK_NETWORK),
        runtime.remove_network(STACK_NETWORK).await,
    );

    println!("Deleting configuration files...");
    report.record(
        "Deleting config file",
        store.remove().await.map(|_| ()),
    );
    report.record(
        "Deleting legacy env file",
        store.layout().legacy_env_file().delete().await.map(|_| ()),
    );

    report
}

/// Purge after confirmation, unless `force` is set.
///
/// A declined prompt returns [`CliError::Cancelled`] before anything is touched.
pub async fn run(
    store: &ConfigStore,
    runtime: &dyn ContainerRuntime,
    force: bool,
    input: &mut dyn BufRead,
) -> Result<(), CliError> {
    if !force {
        println!("{}", "WARNING: This command will remove all Liquid Labs components:".yellow());
        println!("  - Stop and remove all containers");
        println!("  - Delete {} volume (all database data will be lost)", POSTGRES_VOLUME);
        println!("  - Remove {}", STACK_NETWORK);
        println!("  - Delete liquidai.yaml and .env");
        println!();
        if !prompt::confirm(input, "Are you sure you want to proceed?")? {
            return Err(CliError::Cancelled);
        }
    }

    println!("Starting full cleanup of Liquid Labs stack...");
    let report = purge(store, runtime).await;

    if report.warnings.is_empty() {
        println!(
            "{}",
            "Cleanup complete. All Liquid on-prem stack components have been removed.".green()
        );
    } else {
        println!(
            "Cleanup finished with {} warning(s).",
            report.warnings.len()
        );
    }
    Ok(())
}

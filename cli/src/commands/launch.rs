//! `launch`: bring the stack up

use colored::Colorize;
use tracing::info;

use crate::commands::POSTGRES_VOLUME;
use crate::config::env::StackEnv;
use crate::config::model::{DeploymentConfig, DEFAULT_MODEL_IMAGE, DEFAULT_STACK_VERSION};
use crate::config::store::{ConfigSource, ConfigStore};
use crate::errors::CliError;
use crate::runtime::ContainerRuntime;

/// Launch flags
#[derive(Debug, Clone, Copy, Default)]
pub struct LaunchOptions {
    /// Reset the stack version to the release default
    pub upgrade_stack: bool,

    /// Reset the model image to the release default
    pub upgrade_model: bool,
}

/// What a launch did
#[derive(Debug, Clone)]
pub struct LaunchReport {
    pub source: ConfigSource,
    pub config: DeploymentConfig,
    pub volume_created: bool,
}

/// Prepare configuration and start the stack
pub async fn launch(
    store: &ConfigStore,
    runtime: &dyn ContainerRuntime,
    options: LaunchOptions,
) -> Result<LaunchReport, CliError> {
    runtime.check_available().await?;

    let loaded = store.load().await?;
    let source = loaded.source();
    let mut config = loaded.into_config();
    info!("Using configuration from {:?}", source);

    let mut changed = false;
    if options.upgrade_stack {
        info!("Upgrading stack version to {}", DEFAULT_STACK_VERSION);
        config.upgrade_stack();
        changed = true;
    }
    if options.upgrade_model {
        info!("Upgrading model image to {}", DEFAULT_MODEL_IMAGE);
        config.upgrade_model();
        changed = true;
    }
    changed |= config.refresh_derived();

    if changed {
        store.save(&config).await?;
    }

    let volume_created = runtime.ensure_volume(POSTGRES_VOLUME).await?;
    runtime.compose_up(&StackEnv::from_config(&config)).await?;

    Ok(LaunchReport {
        source,
        config,
        volume_created,
    })
}

pub async fn run(
    store: &ConfigStore,
    runtime: &dyn ContainerRuntime,
    options: LaunchOptions,
) -> Result<(), CliError> {
    let report = launch(store, runtime, options).await?;

    match report.source {
        ConfigSource::Legacy => println!(
            "Migrated {} to {} (original kept as {})",
            store.layout().legacy_env_file().path().display(),
            store.layout().config_file().path().display(),
            store.layout().legacy_env_archive().path().display()
        ),
        ConfigSource::Defaults => println!(
            "Generated {}",
            store.layout().config_file().path().display()
        ),
        ConfigSource::Structured => {}
    }
    if report.volume_created {
        println!("Created {} volume", POSTGRES_VOLUME);
    }

    println!("{}", "The on-prem stack is now running.".green());
    println!(
        "\nModel '{}' is accessible at http://localhost:8000",
        report.config.stack.model.name
    );
    println!("Please wait 1-2 minutes for the model to load before making API calls");
    Ok(())
}

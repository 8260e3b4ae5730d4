//! `down`: stop the stack, keeping data

use colored::Colorize;

use crate::commands::POSTGRES_VOLUME;
use crate::config::env::StackEnv;
use crate::config::store::ConfigStore;
use crate::errors::CliError;
use crate::runtime::ContainerRuntime;

/// Stop the stack. Requires an existing `liquidai.yaml`.
pub async fn down(store: &ConfigStore, runtime: &dyn ContainerRuntime) -> Result<(), CliError> {
    let config = store.load_existing().await?;
    runtime.compose_down(&StackEnv::from_config(&config)).await
}

pub async fn run(store: &ConfigStore, runtime: &dyn ContainerRuntime) -> Result<(), CliError> {
    println!("Stopping the Liquid Labs stack...");
    down(store, runtime).await?;

    println!("{}", "Liquid Labs stack has been stopped.".green());
    println!(
        "The {} volume is not deleted. If needed, please remove it manually.",
        POSTGRES_VOLUME
    );
    Ok(())
}

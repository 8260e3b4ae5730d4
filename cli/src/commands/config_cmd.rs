//! `config`: inspect and edit `liquidai.yaml`

use crate::config::env::StackEnv;
use crate::config::model::DeploymentConfig;
use crate::config::store::ConfigStore;
use crate::errors::CliError;

/// Render the stored configuration as YAML
pub async fn show(store: &ConfigStore) -> Result<String, CliError> {
    let config = store.load_existing().await?;
    Ok(serde_yaml::to_string(&config)?)
}

/// Read one dotted key, e.g. `database.port`
pub async fn get(store: &ConfigStore, key: &str) -> Result<String, CliError> {
    store.load_existing().await?.get(key)
}

/// Update one dotted key and persist the result.
///
/// Creates the configuration first (migrating or generating) when needed.
pub async fn set(store: &ConfigStore, key: &str, value: &str) -> Result<DeploymentConfig, CliError> {
    let mut config = store.load().await?.into_config();
    config.set(key, value)?;
    store.save(&config).await?;
    Ok(config)
}

/// The environment the compose stack is started with
pub async fn env(store: &ConfigStore) -> Result<StackEnv, CliError> {
    let config = store.load_existing().await?;
    Ok(StackEnv::from_config(&config))
}

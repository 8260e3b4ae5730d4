//! Config store: load, migrate, initialize and save `liquidai.yaml`

use serde_yaml::Value;
use tracing::{debug, info, warn};

use crate::config::legacy::LegacyEnv;
use crate::config::model::{DeploymentConfig, Field, CONFIG_VERSION};
use crate::errors::CliError;
use crate::storage::layout::ProjectLayout;

/// Where a configuration will come from, decided by file existence alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// `liquidai.yaml` exists
    Structured,
    /// Only the legacy `.env` exists
    Legacy,
    /// Neither file exists
    Defaults,
}

/// Outcome of [`ConfigStore::load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded {
    Existing(DeploymentConfig),
    Migrated(DeploymentConfig),
    Initialized(DeploymentConfig),
}

impl Loaded {
    pub fn source(&self) -> ConfigSource {
        match self {
            Loaded::Existing(_) => ConfigSource::Structured,
            Loaded::Migrated(_) => ConfigSource::Legacy,
            Loaded::Initialized(_) => ConfigSource::Defaults,
        }
    }

    pub fn config(&self) -> &DeploymentConfig {
        match self {
            Loaded::Existing(cfg) | Loaded::Migrated(cfg) | Loaded::Initialized(cfg) => cfg,
        }
    }

    pub fn into_config(self) -> DeploymentConfig {
        match self {
            Loaded::Existing(cfg) | Loaded::Migrated(cfg) | Loaded::Initialized(cfg) => cfg,
        }
    }
}

/// Reads and writes deployment configuration within a project directory
#[derive(Debug, Clone)]
pub struct ConfigStore {
    layout: ProjectLayout,
}

impl ConfigStore {
    pub fn new(layout: ProjectLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Decide which load branch applies
    pub async fn source(&self) -> Result<ConfigSource, CliError> {
        let source = if self.layout.config_file().exists().await? {
            ConfigSource::Structured
        } else if self.layout.legacy_env_file().exists().await? {
            ConfigSource::Legacy
        } else {
            ConfigSource::Defaults
        };
        Ok(source)
    }

    /// Load the configuration, migrating or initializing it when needed
    pub async fn load(&self) -> Result<Loaded, CliError> {
        match self.source().await? {
            ConfigSource::Structured => Ok(Loaded::Existing(self.read().await?)),
            ConfigSource::Legacy => Ok(Loaded::Migrated(self.migrate().await?)),
            ConfigSource::Defaults => Ok(Loaded::Initialized(self.initialize().await?)),
        }
    }

    /// Load an existing `liquidai.yaml` without creating one
    pub async fn load_existing(&self) -> Result<DeploymentConfig, CliError> {
        let config_file = self.layout.config_file();
        if !config_file.exists().await? {
            return Err(CliError::MissingPrerequisite(format!(
                "{} does not exist. Please run the launch command first",
                config_file.path().display()
            )));
        }
        self.read().await
    }

    async fn read(&self) -> Result<DeploymentConfig, CliError> {
        let config_file = self.layout.config_file();
        debug!("Reading config from {}", config_file.path().display());
        config_file.read_yaml().await
    }

    /// Migrate the legacy env file, then archive it
    async fn migrate(&self) -> Result<DeploymentConfig, CliError> {
        let legacy_file = self.layout.legacy_env_file();
        let archive = self.layout.legacy_env_archive();
        info!(
            "Migrating {} to {}",
            legacy_file.path().display(),
            self.layout.config_file().path().display()
        );

        let legacy = LegacyEnv::parse(&legacy_file.read_string().await?);
        debug!("Read {} legacy entries", legacy.len());
        if legacy.is_empty() {
            warn!(
                "{} has no entries, every migrated field will be empty",
                legacy_file.path().display()
            );
        }
        for (key, _) in legacy.entries() {
            if Field::from_env_name(key).is_none() {
                debug!("Ignoring unrecognized legacy key {}", key);
            }
        }

        let config = DeploymentConfig::from_legacy(&legacy);
        self.save(&config).await?;

        legacy_file.rename_to(&archive).await?;
        info!("Archived legacy env file to {}", archive.path().display());

        Ok(config)
    }

    async fn initialize(&self) -> Result<DeploymentConfig, CliError> {
        info!(
            "Generating default config at {}",
            self.layout.config_file().path().display()
        );
        let config = DeploymentConfig::generate();
        self.save(&config).await?;
        Ok(config)
    }

    /// Persist the configuration, keeping unrelated keys already in the file
    pub async fn save(&self, config: &DeploymentConfig) -> Result<(), CliError> {
        let config_file = self.layout.config_file();

        let mut record = serde_yaml::to_value(config)?;
        if let Value::Mapping(map) = &mut record {
            map.insert(Value::from("version"), Value::from(CONFIG_VERSION));
        }

        let document = if config_file.exists().await? {
            let existing: Value = config_file.read_yaml().await?;
            match existing {
                Value::Mapping(_) => {
                    let mut merged = existing;
                    merge_yaml(&mut merged, record);
                    merged
                }
                _ => record,
            }
        } else {
            record
        };

        debug!("Writing config to {}", config_file.path().display());
        config_file.write_yaml(&document).await
    }

    /// Delete `liquidai.yaml`, returning whether it existed
    pub async fn remove(&self) -> Result<bool, CliError> {
        self.layout.config_file().delete().await
    }
}

/// Deep-merge `overlay` into `base`; overlay values win, other keys survive
pub fn merge_yaml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

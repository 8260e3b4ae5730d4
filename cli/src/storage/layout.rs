//! Project directory layout

use std::path::PathBuf;

use crate::filesys::file::File;

/// Structured deployment config
pub const CONFIG_FILE_NAME: &str = "liquidai.yaml";

/// Legacy flat env file, migrated once
pub const LEGACY_ENV_FILE_NAME: &str = ".env";

/// Where the legacy env file is archived after migration
pub const LEGACY_ENV_ARCHIVE_NAME: &str = ".env.bak";

/// Fixed file locations inside a project directory
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Directory holding the config files and the compose project
    pub base_dir: PathBuf,
}

impl ProjectLayout {
    /// Create a new project layout
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Get the structured config file
    pub fn config_file(&self) -> File {
        File::new(self.base_dir.join(CONFIG_FILE_NAME))
    }

    /// Get the legacy env file
    pub fn legacy_env_file(&self) -> File {
        File::new(self.base_dir.join(LEGACY_ENV_FILE_NAME))
    }

    /// Get the archive path for the legacy env file
    pub fn legacy_env_archive(&self) -> File {
        File::new(self.base_dir.join(LEGACY_ENV_ARCHIVE_NAME))
    }
}

//! File operations

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;

use crate::errors::CliError;

/// A file wrapper with path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    path: PathBuf,
}

impl File {
    /// Create a new file reference
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the file exists.
    ///
    /// Only `NotFound` counts as absent; any other metadata failure is an error.
    pub async fn exists(&self) -> Result<bool, CliError> {
        match fs::metadata(&self.path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CliError::io_at(&self.path, e)),
        }
    }

    /// Read file contents as string
    pub async fn read_string(&self) -> Result<String, CliError> {
        fs::read_to_string(&self.path)
            .await
            .map_err(|e| CliError::io_at(&self.path, e))
    }

    /// Read file as YAML
    pub async fn read_yaml<T: DeserializeOwned>(&self) -> Result<T, CliError> {
        let contents = self.read_string().await?;
        serde_yaml::from_str(&contents).map_err(|source| CliError::ConfigParse {
            path: self.path.clone(),
            source,
        })
    }

    /// Read file as JSON
    pub async fn read_json<T: DeserializeOwned>(&self) -> Result<T, CliError> {
        let contents = self.read_string().await?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write string to file
    pub async fn write_string(&self, contents: &str) -> Result<(), CliError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| CliError::io_at(parent, e))?;
            }
        }

        fs::write(&self.path, contents)
            .await
            .map_err(|e| CliError::io_at(&self.path, e))
    }

    /// Write YAML to file
    pub async fn write_yaml<T: Serialize>(&self, value: &T) -> Result<(), CliError> {
        let contents = serde_yaml::to_string(value)?;
        self.write_string(&contents).await
    }

    /// Rename this file to `target`, replacing it if present
    pub async fn rename_to(&self, target: &File) -> Result<(), CliError> {
        fs::rename(&self.path, &target.path)
            .await
            .map_err(|e| CliError::io_at(&self.path, e))
    }

    /// Delete the file, returning whether it existed
    pub async fn delete(&self) -> Result<bool, CliError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CliError::io_at(&self.path, e)),
        }
    }
}

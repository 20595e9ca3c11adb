//! Construction-time configuration: where the snapshot store and the
//! audit trail live on disk. The two locations are independent and are
//! the only environment coupling the engine has.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Account snapshot store, fully rewritten on every mutation.
    pub snapshot_path: PathBuf,
    /// Append-only audit trail.
    pub audit_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl LedgerConfig {
    pub fn new(snapshot_path: impl Into<PathBuf>, audit_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            audit_path: audit_path.into(),
        }
    }

    /// Reads the configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

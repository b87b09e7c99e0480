//! Path management for cadence
//!
//! Resolves the per-user data directory and owns every file location the
//! crate touches.
//!
//! ## Path resolution order
//!
//! 1. `CADENCE_DATA_DIR` environment variable (explicit override)
//! 2. Platform data dir via `directories` (`~/.local/share/cadence-cli`
//!    on Linux, the equivalent on macOS/Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::CadenceError;

/// Manages all paths used by cadence
#[derive(Debug, Clone)]
pub struct CadencePaths {
    base_dir: PathBuf,
}

impl CadencePaths {
    /// Create a new `CadencePaths`, resolving the base directory
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, CadenceError> {
        let base_dir = if let Ok(custom) = std::env::var("CADENCE_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "cadence-cli")
                .ok_or_else(|| {
                    CadenceError::Config("Could not determine a home directory".into())
                })?
                .data_dir()
                .to_path_buf()
        };

        Ok(Self { base_dir })
    }

    /// Create paths rooted at a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// The base directory for all cadence data
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// The cash-flow configuration document (YAML, human-editable)
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.yaml")
    }

    /// The user profile document (debts)
    pub fn profile_file(&self) -> PathBuf {
        self.base_dir.join("profile.yaml")
    }

    /// The recorded cash-flow events file
    pub fn events_file(&self) -> PathBuf {
        self.base_dir.join("data").join("events.json")
    }

    /// The directory holding one JSON document per audit record
    pub fn audits_dir(&self) -> PathBuf {
        self.base_dir.join("audits")
    }

    /// Ensure the base, data, and audits directories exist
    pub fn ensure_directories(&self) -> Result<(), CadenceError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| CadenceError::Io(format!("Failed to create base directory: {}", e)))?;
        std::fs::create_dir_all(self.base_dir.join("data"))
            .map_err(|e| CadenceError::Io(format!("Failed to create data directory: {}", e)))?;
        std::fs::create_dir_all(self.audits_dir())
            .map_err(|e| CadenceError::Io(format!("Failed to create audits directory: {}", e)))?;
        Ok(())
    }

    /// Check whether cadence has been initialized (config document exists)
    pub fn is_initialized(&self) -> bool {
        self.config_file().exists()
    }
}

//! Unified path management for veSave files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/vesave/
//! ├── config.toml      # Application configuration
//! └── session.toml     # Active session wallet (CLI)
//! ```

use std::path::PathBuf;
use vesave_core::{Result, VeSaveError};

const APP_DIR: &str = "vesave";
const CONFIG_FILE: &str = "config.toml";
const SESSION_FILE: &str = "session.toml";

pub struct VeSavePaths;

impl VeSavePaths {
    /// Returns the veSave configuration directory (e.g. `~/.config/vesave/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| VeSaveError::config("Cannot find configuration directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    pub fn session_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(SESSION_FILE))
    }
}

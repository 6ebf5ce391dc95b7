use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".team-roster-manager";
/// Environment variable that relocates the whole data directory.
pub const DATA_DIR_ENV: &str = "TEAM_ROSTER_DATA_DIR";
/// Session database stored inside the data directory.
const SESSION_FILE_NAME: &str = "session.sqlite";
/// Folder that receives CSV exports and rosters.
const EXPORT_DIR_NAME: &str = "exports";
/// Log file written while the TUI owns the terminal.
const LOG_FILE_NAME: &str = "team-roster-manager.log";

/// Where the application keeps its files. One session per installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub session_file: PathBuf,
    pub export_dir: PathBuf,
    pub log_file: PathBuf,
}

impl Config {
    /// Resolve paths from `TEAM_ROSTER_DATA_DIR`, falling back to a folder in
    /// the user's home directory.
    pub fn resolve() -> Result<Self> {
        if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
            return Ok(Self::in_dir(dir));
        }

        let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(Self::in_dir(base_dirs.home_dir().join(DATA_DIR_NAME)))
    }

    /// Lay out every path beneath `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let data_dir = dir.as_ref().to_path_buf();
        Self {
            session_file: data_dir.join(SESSION_FILE_NAME),
            export_dir: data_dir.join(EXPORT_DIR_NAME),
            log_file: data_dir.join(LOG_FILE_NAME),
            data_dir,
        }
    }
}

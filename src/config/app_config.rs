use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::errors::{Result, SyncError};

/// File name looked up in each search location.
pub const CONFIG_FILE_NAME: &str = "cryptsync.toml";

/// Credentials and key material read from `cryptsync.toml`.
///
/// Every field is optional at parse time so that a run can report all
/// missing values in one go instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfig {
    pub bucket_secret_key: Option<String>,
    pub bucket_access_key: Option<String>,
    pub bucket_endpoint: Option<String>,
    pub bucket_region: Option<String>,
    pub pgp_passphrase: Option<String>,
    pub pgp_private_key_armored: Option<String>,
    pub pgp_public_key_armored: Option<String>,
}

impl SyncConfig {
    /// Load the configuration from `explicit` or the first existing
    /// candidate location. Returns the parsed config and where it came from.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, PathBuf)> {
        let searched = match explicit {
            Some(path) => vec![path.to_path_buf()],
            None => candidate_paths(),
        };

        let Some(config_path) = searched.iter().find(|p| p.is_file()) else {
            return Err(SyncError::ConfigNotFound {
                searched: searched
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join("\n    "),
            });
        };
        debug!("loading config from {}", config_path.display());

        let content = std::fs::read_to_string(config_path)?;
        let config = Self::parse(&content).map_err(|e| match e {
            SyncError::InvalidConfig { detail } => SyncError::InvalidConfig {
                detail: format!("{}: {detail}", config_path.display()),
            },
            other => other,
        })?;

        Ok((config, config_path.clone()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SyncError::InvalidConfig {
            detail: format!("failed to parse TOML: {e}"),
        })
    }

    /// Render as TOML for writing a fresh config template.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SyncError::InvalidConfig {
            detail: format!("failed to render TOML: {e}"),
        })
    }
}

/// Search order when no explicit path is given: the working directory,
/// the per-user config directory, then the system-wide location.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("cryptsync").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from("/etc/cryptsync").join(CONFIG_FILE_NAME));
    paths
}

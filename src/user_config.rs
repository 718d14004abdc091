use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::{InstallerError, Result};

/// User overrides read from `config.toml` in the config directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// Home directory the plugin is installed under
    pub home: Option<PathBuf>,
    pub install_dir: Option<PathBuf>,
    pub env_dir: Option<PathBuf>,
    /// systemd unit directory (default /etc/systemd/system)
    pub systemd_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    /// Where backups are written (default ~/swierctl-backups)
    pub backup_dir: Option<PathBuf>,
    /// Back up the install directory before every update
    pub backup_before_update: Option<bool>,
    /// Prefix privileged commands with sudo
    pub use_sudo: Option<bool>,
}

impl UserConfig {
    /// $SWIERCTL_CONFIG_DIR/config.toml or ~/.config/swierctl/config.toml
    pub fn config_path() -> PathBuf {
        crate::clienv::config_dir().join("config.toml")
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        tracing::trace!(path = %path.display(), "Loading user config");

        if !path.exists() {
            tracing::trace!("Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;

        tracing::trace!(home = ?config.home, use_sudo = ?config.use_sudo, "User config loaded");
        Ok(config)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        tracing::trace!(path = %path.display(), "Saving user config");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| InstallerError::ConfigError(e.to_string()))?;
        fs::write(path, content)?;

        tracing::trace!("User config saved");
        Ok(())
    }

    pub fn backup_before_update(&self) -> bool {
        self.backup_before_update.unwrap_or(true)
    }

    /// Sudo is pointless when already running as root
    pub fn use_sudo(&self) -> bool {
        self.use_sudo.unwrap_or(true) && !crate::clienv::is_root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = UserConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(config.home.is_none());
        assert!(config.backup_before_update());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = UserConfig {
            home: Some(PathBuf::from("/home/pi")),
            backup_before_update: Some(false),
            use_sudo: Some(false),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = UserConfig::load_from(&path).unwrap();
        assert_eq!(loaded.home, Some(PathBuf::from("/home/pi")));
        assert!(!loaded.backup_before_update());
        assert!(!loaded.use_sudo());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "home = [").unwrap();
        assert!(matches!(
            UserConfig::load_from(&path),
            Err(InstallerError::Toml(_))
        ));
    }
}

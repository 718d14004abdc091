//! Filesystem layout of one SwierVision installation.
//!
//! Every operation takes a [`Paths`] instead of reading globals, so tests
//! can point the whole layout into a temporary directory.

use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{InstallerError, Result};
use crate::project_config::PluginConfig;
use crate::user_config::UserConfig;

const DEFAULT_SYSTEMD_DIR: &str = "/etc/systemd/system";
const DEFAULT_BACKUP_SUBDIR: &str = "swierctl-backups";

#[derive(Debug, Clone, Serialize)]
pub struct Paths {
    pub home: PathBuf,
    pub install_dir: PathBuf,
    pub env_dir: PathBuf,
    pub systemd_dir: PathBuf,
    pub log_file: PathBuf,
    pub backup_dir: PathBuf,
}

impl Paths {
    /// Default layout below `home`.
    pub fn from_home(home: impl Into<PathBuf>, plugin: &PluginConfig) -> Self {
        let home = home.into();
        Self {
            install_dir: home.join(&plugin.install_dir),
            env_dir: home.join(&plugin.env_dir),
            systemd_dir: PathBuf::from(DEFAULT_SYSTEMD_DIR),
            log_file: PathBuf::from(&plugin.log_file),
            backup_dir: home.join(DEFAULT_BACKUP_SUBDIR),
            home,
        }
    }

    /// Defaults, then user config, with $SWIERCTL_HOME taking priority for home.
    pub fn resolve(user: &UserConfig, plugin: &PluginConfig) -> Result<Self> {
        let home = crate::clienv::home_override()
            .or_else(|| user.home.clone())
            .or_else(dirs::home_dir)
            .ok_or_else(|| {
                InstallerError::ConfigError("Cannot determine the home directory".to_string())
            })?;

        let mut paths = Self::from_home(home, plugin);
        if let Some(dir) = &user.install_dir {
            paths.install_dir = dir.clone();
        }
        if let Some(dir) = &user.env_dir {
            paths.env_dir = dir.clone();
        }
        if let Some(dir) = &user.systemd_dir {
            paths.systemd_dir = dir.clone();
        }
        if let Some(file) = &user.log_file {
            paths.log_file = file.clone();
        }
        if let Some(dir) = &user.backup_dir {
            paths.backup_dir = dir.clone();
        }

        tracing::debug!(
            home = %paths.home.display(),
            install_dir = %paths.install_dir.display(),
            systemd_dir = %paths.systemd_dir.display(),
            "Resolved paths"
        );
        Ok(paths)
    }

    pub fn service_unit(&self, service: &str) -> PathBuf {
        self.systemd_dir.join(format!("{}.service", service))
    }

    /// Python interpreter inside the virtual environment
    pub fn env_python(&self) -> PathBuf {
        self.env_dir.join("bin").join("python")
    }

    pub fn env_pip(&self) -> PathBuf {
        self.env_dir.join("bin").join("pip")
    }

    /// Printer data directories (`printer_data`, `printer_1_data`, `<name>_data`)
    /// directly below home that hold a `config` directory.
    pub fn printer_data_dirs(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(&self.home) else {
            return Vec::new();
        };

        let mut dirs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| data_dir_pattern().is_match(name))
            })
            .map(|entry| entry.path())
            .filter(|path| path.join("config").is_dir())
            .collect();
        dirs.sort();
        dirs
    }
}

fn data_dir_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[\w-]+_data$").expect("valid regex"))
}

/// `path` exists, including symlinks whose target is gone
pub fn path_present(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

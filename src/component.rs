use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentInfo {
    /// Registry key, lowercase
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InstallConfig {
    /// Answer yes to every prompt
    pub assume_yes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InstallStatus {
    NotInstalled,
    Installed,
    Incomplete,
}

impl InstallStatus {
    /// Derives the status from how many of the expected paths exist.
    pub fn from_counts(present: usize, expected: usize) -> Self {
        if present == 0 {
            Self::NotInstalled
        } else if present >= expected {
            Self::Installed
        } else {
            Self::Incomplete
        }
    }
}

impl fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotInstalled => "Not installed",
            Self::Installed => "Installed",
            Self::Incomplete => "Incomplete",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub local: Option<String>,
    pub remote: Option<String>,
}

impl VersionInfo {
    pub fn update_available(&self) -> bool {
        match (&self.local, &self.remote) {
            (Some(local), Some(remote)) => local != remote,
            _ => false,
        }
    }
}

/// Core trait for managed components.
/// Implement this trait to add new installable components.
#[async_trait]
pub trait Component: Send + Sync {
    /// Returns component metadata
    fn info(&self) -> &ComponentInfo;

    /// Checks current installation status
    async fn status(&self) -> Result<InstallStatus>;

    /// Performs the installation
    async fn install(&self, config: &InstallConfig) -> Result<()>;

    /// Removes the component
    async fn uninstall(&self) -> Result<()>;

    /// Updates to latest version (default: reinstall)
    async fn update(&self, config: &InstallConfig) -> Result<()> {
        self.uninstall().await?;
        self.install(config).await
    }

    /// Local and remote version, if the component tracks one
    async fn version(&self) -> Result<VersionInfo> {
        Ok(VersionInfo::default())
    }

    /// Registers the component with an external update mechanism.
    /// Returns the files that were changed.
    async fn register_updates(&self) -> Result<Vec<PathBuf>> {
        Ok(vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_every_subset() {
        // three tracked paths: 2^3 combinations
        for mask in 0u8..8 {
            let present = mask.count_ones() as usize;
            let status = InstallStatus::from_counts(present, 3);
            let expected = match present {
                0 => InstallStatus::NotInstalled,
                3 => InstallStatus::Installed,
                _ => InstallStatus::Incomplete,
            };
            assert_eq!(status, expected, "mask {mask:03b}");
        }
    }

    #[test]
    fn test_status_display() {
        assert_eq!(InstallStatus::NotInstalled.to_string(), "Not installed");
        assert_eq!(InstallStatus::Incomplete.to_string(), "Incomplete");
    }

    #[test]
    fn test_update_available() {
        let same = VersionInfo {
            local: Some("v1.0-3".into()),
            remote: Some("v1.0-3".into()),
        };
        assert!(!same.update_available());

        let behind = VersionInfo {
            local: Some("v1.0-3".into()),
            remote: Some("v1.0-5".into()),
        };
        assert!(behind.update_available());

        assert!(!VersionInfo::default().update_available());
    }
}

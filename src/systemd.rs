//! systemd service control
//!
//! Start/stop/restart/enable/disable go through `systemctl` as privileged
//! commands. Unit discovery reads the unit directory directly.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{InstallerError, Result};
use crate::executor::{CommandRunner, CommandSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Enable,
    Disable,
}

impl ServiceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Enable => "enable",
            Self::Disable => "disable",
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct ServiceControl {
    runner: Arc<dyn CommandRunner>,
}

impl ServiceControl {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// `systemctl <action> <unit>`
    pub async fn action(&self, action: ServiceAction, unit: &str) -> Result<()> {
        let spec = CommandSpec::new("systemctl")
            .args([action.as_str(), unit])
            .privileged();
        let output = self.runner.run(&spec).await?;

        if output.success {
            info!("{} systemd unit '{}'", action, unit);
            Ok(())
        } else {
            Err(InstallerError::Service {
                action: action.to_string(),
                unit: unit.to_string(),
                reason: output.stderr.trim().to_string(),
            })
        }
    }

    /// Failure is logged and swallowed; used where the unit may already be gone.
    pub async fn action_quiet(&self, action: ServiceAction, unit: &str) {
        if let Err(e) = self.action(action, unit).await {
            warn!("Ignoring failure: {}", e);
        }
    }

    pub async fn daemon_reload(&self) -> Result<()> {
        let spec = CommandSpec::new("systemctl").arg("daemon-reload").privileged();
        self.runner.run_checked(&spec).await?;
        debug!("Reloaded systemd daemon");
        Ok(())
    }

    pub async fn reset_failed(&self) -> Result<()> {
        let spec = CommandSpec::new("systemctl").arg("reset-failed").privileged();
        self.runner.run_checked(&spec).await?;
        Ok(())
    }
}

/// Companion unit serving the config found at `<home>/<dir>_data/config/<file>`.
///
/// `printer_data` belongs to the bare unit, `printer_<n>_data` to `<base>-<n>`
/// and `<name>_data` to `<base>-<name>`. Configs outside a data directory
/// fall back to the bare unit.
pub fn instance_unit(base: &str, config_file: &Path) -> String {
    let data_dir = config_file
        .parent()
        .and_then(Path::parent)
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix("_data"));

    match data_dir {
        None | Some("printer") => base.to_string(),
        Some(dir) => {
            let instance = dir.strip_prefix("printer_").unwrap_or(dir);
            format!("{}-{}", base, instance)
        }
    }
}

/// A unit file in `systemd_dir` whose name matches `name` case-insensitively.
pub fn find_unit_file_ignore_case(systemd_dir: &Path, name: &str) -> Option<PathBuf> {
    let wanted = format!("{}.service", name).to_lowercase();
    std::fs::read_dir(systemd_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_name().to_string_lossy().to_lowercase() == wanted)
        .map(|entry| entry.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::FakeRunner;
    use std::fs;

    #[tokio::test]
    async fn test_action_runs_privileged_systemctl() {
        let runner = Arc::new(FakeRunner::new());
        let services = ServiceControl::new(runner.clone());

        services
            .action(ServiceAction::Restart, "SwierVision")
            .await
            .unwrap();

        assert_eq!(runner.calls(), vec!["systemctl restart SwierVision"]);
        assert!(runner.specs()[0].privileged);
    }

    #[tokio::test]
    async fn test_action_failure() {
        let runner = Arc::new(FakeRunner::new().fail("systemctl stop", "Unit not loaded"));
        let services = ServiceControl::new(runner.clone());

        let err = services
            .action(ServiceAction::Stop, "SwierVision")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unit not loaded"));

        // quiet variant swallows it
        services.action_quiet(ServiceAction::Stop, "SwierVision").await;
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn test_instance_unit() {
        let home = Path::new("/home/pi");
        let unit = |dir: &str| instance_unit("moonraker", &home.join(dir).join("config/moonraker.conf"));

        assert_eq!(unit("printer_data"), "moonraker");
        assert_eq!(unit("printer_2_data"), "moonraker-2");
        assert_eq!(unit("voron_data"), "moonraker-voron");
        assert_eq!(unit("klipper_config"), "moonraker");
        assert_eq!(instance_unit("moonraker", Path::new("moonraker.conf")), "moonraker");
    }

    #[test]
    fn test_find_unit_file_ignore_case() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Moonraker-SwierVision.service"), "").unwrap();

        assert!(find_unit_file_ignore_case(dir.path(), "moonraker-swiervision").is_some());
        assert!(find_unit_file_ignore_case(dir.path(), "SwierVision").is_none());
    }
}

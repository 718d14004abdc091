use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use crate::component::{InstallConfig, InstallStatus, VersionInfo};
use crate::error::Result;
use crate::registry::ComponentRegistry;
use crate::updates::ApplicationUpdates;

/// One line of `status` output.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StatusReport {
    pub id: String,
    pub name: String,
    pub status: InstallStatus,
    pub version: VersionInfo,
    pub update_available: bool,
}

pub struct Installer {
    registry: ComponentRegistry,
}

impl Installer {
    pub fn new(registry: ComponentRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub async fn install(&self, component_name: &str, config: &InstallConfig) -> Result<()> {
        let component = self.registry.get(component_name)?;
        tracing::info!(component = %component.info().name, "Installing");
        component.install(config).await
    }

    pub async fn uninstall(&self, component_name: &str) -> Result<()> {
        let component = self.registry.get(component_name)?;
        tracing::info!(component = %component.info().name, "Removing");
        component.uninstall().await
    }

    pub async fn update(&self, component_name: &str, config: &InstallConfig) -> Result<()> {
        let component = self.registry.get(component_name)?;
        tracing::info!(component = %component.info().name, "Updating");
        component.update(config).await
    }

    pub async fn register_updates(&self, component_name: &str) -> Result<Vec<PathBuf>> {
        let component = self.registry.get(component_name)?;
        component.register_updates().await
    }

    pub async fn status(&self, component_name: &str) -> Result<InstallStatus> {
        let component = self.registry.get(component_name)?;
        component.status().await
    }

    /// Status and version of every component. Components with a newer
    /// remote version are added to `updates`.
    pub async fn report(&self, updates: &mut ApplicationUpdates) -> Result<Vec<StatusReport>> {
        let mut reports = Vec::new();

        for component in self.registry.list() {
            let info = component.info();
            let status = component.status().await?;

            let pb = create_progress_bar(&format!("Checking {} for updates", info.name));
            let version = component.version().await;
            pb.finish_and_clear();
            let version = version?;

            let update_available = version.update_available();
            if update_available {
                updates.add(&info.id);
            }

            reports.push(StatusReport {
                id: info.id.clone(),
                name: info.name.clone(),
                status,
                version,
                update_available,
            });
        }

        Ok(reports)
    }
}

fn create_progress_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::swiervision::{Options, SwierVision};
    use crate::executor::testing::FakeRunner;
    use crate::paths::Paths;
    use crate::project_config::ProjectConfig;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_report_collects_updates() {
        let home = tempfile::tempdir().unwrap();
        let mut paths = Paths::from_home(home.path(), &ProjectConfig::get().plugin);
        paths.systemd_dir = home.path().join("systemd");
        std::fs::create_dir_all(paths.install_dir.join(".git")).unwrap();

        let runner = Arc::new(
            FakeRunner::new()
                .respond("git describe HEAD", "v0.9-1-gaaaaaaa")
                .respond("git describe origin/master", "v1.0-0-gbbbbbbb"),
        );
        let mut registry = ComponentRegistry::new();
        registry.register(Box::new(SwierVision::new(
            paths,
            Options {
                backup_before_update: false,
                use_sudo: false,
            },
            runner,
        )));
        let installer = Installer::new(registry);

        let mut updates = ApplicationUpdates::new();
        let reports = installer.report(&mut updates).await.unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, InstallStatus::Incomplete);
        assert!(reports[0].update_available);
        assert!(updates.contains("swiervision"));
        assert_eq!(
            installer.status("SwierVision").await.unwrap(),
            InstallStatus::Incomplete
        );
    }
}

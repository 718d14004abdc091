use async_trait::async_trait;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::backup;
use crate::component::{Component, ComponentInfo, InstallConfig, InstallStatus, VersionInfo};
use crate::deps;
use crate::error::{InstallerError, Result};
use crate::executor::{CommandRunner, CommandSpec};
use crate::git;
use crate::paths::{path_present, Paths};
use crate::pipeline::{self, PipelineState, Step, StepExecutor};
use crate::project_config::{CompanionConfig, PluginConfig, ProjectConfig};
use crate::python;
use crate::systemd::{self, ServiceAction, ServiceControl};
use crate::update_manager::{self, UpdateManagerEntry};

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub backup_before_update: bool,
    /// Privileged file removal goes through `sudo rm` instead of direct deletion
    pub use_sudo: bool,
}

pub struct SwierVision {
    info: ComponentInfo,
    plugin: PluginConfig,
    companion: CompanionConfig,
    paths: Paths,
    options: Options,
    runner: Arc<dyn CommandRunner>,
    services: ServiceControl,
}

impl SwierVision {
    pub fn new(paths: Paths, options: Options, runner: Arc<dyn CommandRunner>) -> Self {
        let project = ProjectConfig::get();
        Self {
            info: ComponentInfo {
                id: project.plugin.name.to_lowercase(),
                name: project.plugin.name.clone(),
                description: "Touchscreen GUI for Klipper printers".to_string(),
            },
            plugin: project.plugin.clone(),
            companion: project.companion.clone(),
            services: ServiceControl::new(runner.clone()),
            paths,
            options,
            runner,
        }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    fn requirements_file(&self) -> PathBuf {
        self.paths.install_dir.join(&self.plugin.requirements)
    }

    fn install_script(&self) -> PathBuf {
        self.paths.install_dir.join(&self.plugin.install_script)
    }

    fn service_unit(&self) -> PathBuf {
        self.paths.service_unit(&self.plugin.service)
    }

    pub fn update_manager_entry(&self) -> UpdateManagerEntry {
        UpdateManagerEntry {
            name: self.plugin.name.clone(),
            path: self.paths.install_dir.clone(),
            origin: self.plugin.origin.clone(),
            env: self.paths.env_python(),
            requirements: self.plugin.requirements.clone(),
            install_script: self.plugin.install_script.clone(),
        }
    }

    /// Moonraker can ship its own unit for the plugin (`moonraker-SwierVision.service`).
    /// In that case the plugin's own unit is not expected.
    fn companion_supervises(&self) -> bool {
        let name = format!("{}-{}", self.companion.service, self.plugin.service);
        systemd::find_unit_file_ignore_case(&self.paths.systemd_dir, &name).is_some()
    }

    fn tracked_paths(&self) -> Vec<PathBuf> {
        let mut tracked = vec![self.paths.install_dir.clone(), self.paths.env_dir.clone()];
        if self.companion_supervises() {
            debug!("Service unit supervised by {}, not tracked", self.companion.service);
        } else {
            tracked.push(self.service_unit());
        }
        tracked
    }

    /// `logs/<service>.log` links inside every printer data directory
    fn log_links(&self) -> Vec<PathBuf> {
        self.paths
            .printer_data_dirs()
            .into_iter()
            .map(|dir| dir.join("logs").join(format!("{}.log", self.plugin.service)))
            .collect()
    }

    /// Companion instances owning the patched configs, each listed once.
    /// Instances without an installed unit are skipped; the bare unit is
    /// the fallback when none is installed.
    fn companion_units(&self, patched: &[PathBuf]) -> Vec<String> {
        let base = &self.companion.service;
        let mut units: Vec<String> = patched
            .iter()
            .map(|file| systemd::instance_unit(base, file))
            .filter(|unit| path_present(&self.paths.service_unit(unit)))
            .collect();
        units.sort();
        units.dedup();
        if units.is_empty() {
            units.push(base.clone());
        }
        units
    }

    async fn patch_update_manager(&self) -> Result<Vec<PathBuf>> {
        let files = update_manager::find_config_files(
            &self.paths.home,
            &self.companion.config_file,
            self.companion.search_depth,
        );
        if files.is_empty() {
            info!("No {} found, skipping update manager registration", self.companion.config_file);
            return Ok(Vec::new());
        }

        let report = update_manager::patch_all(&files, &self.update_manager_entry()).await;
        for (file, reason) in &report.failed {
            crate::out_warn!("Could not register in {}: {}", file.display(), reason);
        }
        if report.any_patched() {
            for unit in self.companion_units(&report.patched) {
                self.services.action_quiet(ServiceAction::Restart, &unit).await;
            }
        }
        Ok(report.patched)
    }

    async fn run_install_script(&self) -> Result<()> {
        let script = self.install_script();
        if !script.is_file() {
            return Err(InstallerError::InstallScriptFailed {
                script,
                reason: "script not found in repository".to_string(),
            });
        }

        let spec = CommandSpec::new("bash")
            .arg(&script)
            .current_dir(&self.paths.install_dir)
            .interactive();
        let output = self.runner.run(&spec).await?;

        if !output.success {
            return Err(InstallerError::InstallScriptFailed {
                script,
                reason: match output.code {
                    Some(code) => format!("exited with code {}", code),
                    None => "terminated by signal".to_string(),
                },
            });
        }
        Ok(())
    }

    async fn remove_service_unit(&self, state: &mut PipelineState) -> Result<()> {
        let unit = self.service_unit();
        if !path_present(&unit) {
            return Ok(());
        }

        self.services.action_quiet(ServiceAction::Stop, &self.plugin.service).await;
        self.services.action_quiet(ServiceAction::Disable, &self.plugin.service).await;

        if self.options.use_sudo {
            let spec = CommandSpec::new("rm").arg("-f").arg(&unit).privileged();
            self.runner.run_checked(&spec).await?;
        } else {
            tokio::fs::remove_file(&unit).await?;
        }

        self.services.daemon_reload().await?;
        self.services.reset_failed().await?;
        state.removed.push(unit);
        Ok(())
    }

    async fn reinstall_requirements(&self, state: &mut PipelineState) -> Result<()> {
        let requirements = self.requirements_file();
        let after = python::requirements_digest(&requirements).await?;

        if after == state.requirements_before {
            info!("Requirements unchanged, keeping python environment");
            return Ok(());
        }
        if after.is_none() {
            warn!(file = %requirements.display(), "Requirements file removed upstream");
            return Ok(());
        }

        python::install_requirements(self.runner.as_ref(), &self.paths.env_pip(), &requirements)
            .await?;
        state.requirements_reinstalled = true;
        Ok(())
    }
}

async fn remove_dir_if_present(dir: &Path, state: &mut PipelineState) -> Result<()> {
    if dir.is_dir() {
        tokio::fs::remove_dir_all(dir).await?;
        debug!(dir = %dir.display(), "Removed directory");
        state.removed.push(dir.to_path_buf());
    }
    Ok(())
}

async fn remove_file_if_present(file: &Path, state: &mut PipelineState) -> Result<()> {
    if path_present(file) {
        tokio::fs::remove_file(file).await?;
        debug!(file = %file.display(), "Removed file");
        state.removed.push(file.to_path_buf());
    }
    Ok(())
}

fn confirm_packages(missing: &[String], assume_yes: bool) -> bool {
    if assume_yes || !std::io::stdin().is_terminal() {
        return true;
    }
    dialoguer::Confirm::with_theme(&dialoguer::theme::ColorfulTheme::default())
        .with_prompt(format!("Install missing packages: {}?", missing.join(", ")))
        .default(true)
        .interact()
        .unwrap_or(false)
}

/// One pipeline run with its install options.
struct Run<'a> {
    component: &'a SwierVision,
    config: &'a InstallConfig,
}

#[async_trait]
impl<'a> StepExecutor for Run<'a> {
    fn on_step(&self, step: Step) {
        crate::out_info!("{}", step);
    }

    async fn execute(&self, step: Step, state: &mut PipelineState) -> Result<()> {
        let sv = self.component;
        let runner = sv.runner.as_ref();
        let plugin = &sv.plugin;

        match step {
            Step::CheckPython => {
                let min = plugin.min_python_version().ok_or_else(|| {
                    InstallerError::ConfigError(format!("Invalid min_python: {}", plugin.min_python))
                })?;
                python::python3_check(runner, min).await?;
            }
            Step::CheckDependencies => {
                let assume_yes = self.config.assume_yes;
                deps::dependency_check(runner, &plugin.name, &plugin.packages, |missing| {
                    confirm_packages(missing, assume_yes)
                })
                .await?;
            }
            Step::BackupConfig => {
                if let Some(target) = backup::backup_config_dir(&sv.paths).await? {
                    state.backups.push(target);
                }
            }
            Step::RemoveExisting => remove_dir_if_present(&sv.paths.install_dir, state).await?,
            Step::Clone => git::clone(runner, &plugin.origin, &sv.paths.install_dir).await?,
            Step::RunInstallScript => sv.run_install_script().await?,
            Step::PatchUpdateManager => state.patched_files = sv.patch_update_manager().await?,
            Step::RestartService => {
                sv.services
                    .action(ServiceAction::Restart, &plugin.service)
                    .await?
            }
            Step::DigestRequirements => {
                state.requirements_before =
                    python::requirements_digest(&sv.requirements_file()).await?;
            }
            Step::StopService => {
                sv.services
                    .action_quiet(ServiceAction::Stop, &plugin.service)
                    .await
            }
            Step::BackupInstall => {
                let target = backup::backup_before_update(
                    &sv.paths,
                    &sv.info.id,
                    &sv.paths.install_dir,
                    sv.options.backup_before_update,
                )
                .await?;
                state.backups.extend(target);
            }
            Step::Pull => git::pull_force(runner, &sv.paths.install_dir, &plugin.branch).await?,
            Step::Checkout => {
                git::checkout_force(runner, &sv.paths.install_dir, &plugin.branch).await?
            }
            Step::ReinstallRequirements => sv.reinstall_requirements(state).await?,
            Step::RemoveInstallDir => remove_dir_if_present(&sv.paths.install_dir, state).await?,
            Step::RemoveEnvDir => remove_dir_if_present(&sv.paths.env_dir, state).await?,
            Step::RemoveServiceUnit => sv.remove_service_unit(state).await?,
            Step::RemoveLogs => {
                remove_file_if_present(&sv.paths.log_file, state).await?;
                for link in sv.log_links() {
                    remove_file_if_present(&link, state).await?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Component for SwierVision {
    fn info(&self) -> &ComponentInfo {
        &self.info
    }

    async fn status(&self) -> Result<InstallStatus> {
        let tracked = self.tracked_paths();
        let present = tracked.iter().filter(|p| path_present(p)).count();
        Ok(InstallStatus::from_counts(present, tracked.len()))
    }

    async fn install(&self, config: &InstallConfig) -> Result<()> {
        let run = Run {
            component: self,
            config,
        };
        let state = pipeline::INSTALL.run(&run).await?;
        debug!(patched = ?state.patched_files, backups = ?state.backups, "Install finished");
        Ok(())
    }

    async fn uninstall(&self) -> Result<()> {
        let config = InstallConfig::default();
        let run = Run {
            component: self,
            config: &config,
        };
        let state = pipeline::REMOVE.run(&run).await?;
        debug!(removed = ?state.removed, "Removal finished");
        Ok(())
    }

    async fn update(&self, config: &InstallConfig) -> Result<()> {
        if !self.paths.install_dir.is_dir() {
            return Err(InstallerError::NotInstalled(self.info.name.clone()));
        }

        let run = Run {
            component: self,
            config,
        };
        let state = pipeline::UPDATE.run(&run).await?;
        debug!(
            requirements_reinstalled = state.requirements_reinstalled,
            "Update finished"
        );
        Ok(())
    }

    async fn version(&self) -> Result<VersionInfo> {
        let repo = &self.paths.install_dir;
        if !repo.join(".git").exists() {
            return Ok(VersionInfo::default());
        }

        let local = git::local_version(self.runner.as_ref(), repo).await?;
        let remote = match git::remote_version(self.runner.as_ref(), repo, &self.plugin.branch).await {
            Ok(remote) => Some(remote),
            Err(e) => {
                warn!("Could not determine remote version: {}", e);
                None
            }
        };

        Ok(VersionInfo {
            local: Some(local),
            remote,
        })
    }

    async fn register_updates(&self) -> Result<Vec<PathBuf>> {
        self.patch_update_manager().await
    }
}

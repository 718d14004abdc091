//! Ordered, typed installation steps.
//!
//! An operation is a [`Pipeline`]: a list of [`Step`]s run one after the
//! other, plus `finally` steps that run even when an earlier step failed.
//! The first error stops the regular steps and is returned after the
//! `finally` steps have run.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CheckPython,
    CheckDependencies,
    BackupConfig,
    RemoveExisting,
    Clone,
    RunInstallScript,
    PatchUpdateManager,
    RestartService,
    DigestRequirements,
    StopService,
    BackupInstall,
    Pull,
    Checkout,
    ReinstallRequirements,
    RemoveInstallDir,
    RemoveEnvDir,
    RemoveServiceUnit,
    RemoveLogs,
}

impl Step {
    pub fn description(&self) -> &'static str {
        match self {
            Self::CheckPython => "Checking python version",
            Self::CheckDependencies => "Checking dependencies",
            Self::BackupConfig => "Backing up printer configuration",
            Self::RemoveExisting => "Removing previous installation",
            Self::Clone => "Cloning repository",
            Self::RunInstallScript => "Running install script",
            Self::PatchUpdateManager => "Registering with update manager",
            Self::RestartService => "Restarting service",
            Self::DigestRequirements => "Recording requirements checksum",
            Self::StopService => "Stopping service",
            Self::BackupInstall => "Backing up installation",
            Self::Pull => "Pulling latest changes",
            Self::Checkout => "Checking out branch",
            Self::ReinstallRequirements => "Updating python dependencies",
            Self::RemoveInstallDir => "Removing install directory",
            Self::RemoveEnvDir => "Removing virtual environment",
            Self::RemoveServiceUnit => "Removing service",
            Self::RemoveLogs => "Removing log files",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Facts gathered while a pipeline runs.
#[derive(Debug, Default)]
pub struct PipelineState {
    pub requirements_before: Option<String>,
    pub requirements_reinstalled: bool,
    pub patched_files: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub backups: Vec<PathBuf>,
    pub completed: Vec<Step>,
}

#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute(&self, step: Step, state: &mut PipelineState) -> Result<()>;

    /// Called before each step, for progress output
    fn on_step(&self, _step: Step) {}
}

#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    pub name: &'static str,
    pub steps: &'static [Step],
    pub finally: &'static [Step],
}

pub const INSTALL: Pipeline = Pipeline {
    name: "install",
    steps: &[
        Step::CheckPython,
        Step::CheckDependencies,
        Step::BackupConfig,
        Step::RemoveExisting,
        Step::Clone,
        Step::RunInstallScript,
        Step::PatchUpdateManager,
        Step::RestartService,
    ],
    finally: &[],
};

pub const UPDATE: Pipeline = Pipeline {
    name: "update",
    steps: &[
        Step::DigestRequirements,
        Step::StopService,
        Step::BackupInstall,
        Step::Pull,
        Step::Checkout,
        Step::ReinstallRequirements,
    ],
    finally: &[Step::RestartService],
};

pub const REMOVE: Pipeline = Pipeline {
    name: "remove",
    steps: &[
        Step::RemoveInstallDir,
        Step::RemoveEnvDir,
        Step::RemoveServiceUnit,
        Step::RemoveLogs,
    ],
    finally: &[],
};

impl Pipeline {
    pub async fn run(&self, executor: &dyn StepExecutor) -> Result<PipelineState> {
        let mut state = PipelineState::default();
        let mut failure = None;

        for &step in self.steps {
            if let Err(e) = Self::run_step(executor, step, &mut state).await {
                error!(pipeline = self.name, step = ?step, "Step failed: {}", e);
                failure = Some(e);
                break;
            }
        }

        for &step in self.finally {
            if let Err(e) = Self::run_step(executor, step, &mut state).await {
                error!(pipeline = self.name, step = ?step, "Step failed: {}", e);
                failure.get_or_insert(e);
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(state),
        }
    }

    async fn run_step(
        executor: &dyn StepExecutor,
        step: Step,
        state: &mut PipelineState,
    ) -> Result<()> {
        debug!(step = ?step, "Running step");
        executor.on_step(step);
        executor.execute(step, state).await?;
        state.completed.push(step);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InstallerError;
    use std::sync::Mutex;

    struct Recorder {
        fail_on: Option<Step>,
        seen: Mutex<Vec<Step>>,
    }

    impl Recorder {
        fn new(fail_on: Option<Step>) -> Self {
            Self {
                fail_on,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl StepExecutor for Recorder {
        async fn execute(&self, step: Step, _state: &mut PipelineState) -> Result<()> {
            self.seen.lock().unwrap().push(step);
            if self.fail_on == Some(step) {
                return Err(InstallerError::Other(format!("{step} failed")));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_runs_in_order() {
        let recorder = Recorder::new(None);
        let state = REMOVE.run(&recorder).await.unwrap();

        assert_eq!(*recorder.seen.lock().unwrap(), REMOVE.steps);
        assert_eq!(state.completed, REMOVE.steps);
    }

    #[tokio::test]
    async fn test_failure_stops_pipeline() {
        let recorder = Recorder::new(Some(Step::Clone));
        let err = INSTALL.run(&recorder).await.unwrap_err();

        assert_eq!(err.to_string(), "Cloning repository failed");
        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.last(), Some(&Step::Clone));
        assert!(!seen.contains(&Step::RunInstallScript));
    }

    #[tokio::test]
    async fn test_finally_runs_after_failure() {
        let recorder = Recorder::new(Some(Step::Pull));
        let err = UPDATE.run(&recorder).await.unwrap_err();

        assert_eq!(err.to_string(), "Pulling latest changes failed");
        let seen = recorder.seen.lock().unwrap();
        assert!(!seen.contains(&Step::Checkout));
        assert_eq!(seen.last(), Some(&Step::RestartService));
    }
}

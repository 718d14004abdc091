use tracing::{debug, info};

use crate::error::{InstallerError, Result};
use crate::executor::{CommandRunner, CommandSpec};

/// Whether dpkg reports `package` as installed
pub async fn is_installed(runner: &dyn CommandRunner, package: &str) -> Result<bool> {
    let spec = CommandSpec::new("dpkg-query").args(["-f", "${Status}", "--show", package]);
    let output = runner.run(&spec).await?;
    Ok(output.success && output.stdout.contains("ok installed"))
}

/// Packages from `packages` that are not installed yet
pub async fn missing_packages(runner: &dyn CommandRunner, packages: &[String]) -> Result<Vec<String>> {
    let mut missing = Vec::new();
    for package in packages {
        if is_installed(runner, package).await? {
            debug!(package = %package, "Dependency present");
        } else {
            missing.push(package.clone());
        }
    }
    Ok(missing)
}

/// Installs every missing package with apt-get. `confirm` is asked once
/// with the missing list and may veto the installation.
pub async fn dependency_check(
    runner: &dyn CommandRunner,
    component: &str,
    packages: &[String],
    confirm: impl FnOnce(&[String]) -> bool,
) -> Result<Vec<String>> {
    let missing = missing_packages(runner, packages).await?;
    if missing.is_empty() {
        return Ok(missing);
    }

    if !confirm(&missing) {
        return Err(InstallerError::DependencyMissing {
            component: component.to_string(),
            dependency: missing.join(", "),
        });
    }

    info!(packages = ?missing, "Installing missing dependencies");
    let update = CommandSpec::new("apt-get")
        .args(["update", "--allow-releaseinfo-change"])
        .privileged();
    runner.run_checked(&update).await?;

    let install = CommandSpec::new("apt-get")
        .arg("install")
        .args(&missing)
        .arg("-y")
        .privileged();
    runner.run_checked(&install).await?;

    Ok(missing)
}

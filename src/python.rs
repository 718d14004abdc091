use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{InstallerError, Result};
use crate::executor::{CommandRunner, CommandSpec};

/// Fails unless `python3 --version` reports at least `min`.
pub async fn python3_check(runner: &dyn CommandRunner, min: (u32, u32)) -> Result<String> {
    let required = format!("{}.{}", min.0, min.1);
    let spec = CommandSpec::new("python3").arg("--version");

    let output = match runner.run(&spec).await {
        Ok(output) => output,
        Err(InstallerError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(InstallerError::PythonTooOld {
                found: "none".to_string(),
                required,
            });
        }
        Err(e) => return Err(e),
    };
    // Python < 3.4 printed the version on stderr
    let reported = if output.stdout.trim().is_empty() {
        output.stderr.trim().to_string()
    } else {
        output.stdout.trim().to_string()
    };

    if !output.success {
        return Err(InstallerError::PythonTooOld {
            found: "none".to_string(),
            required,
        });
    }

    let version = parse_python_version(&reported).ok_or_else(|| InstallerError::PythonTooOld {
        found: reported.clone(),
        required: required.clone(),
    })?;

    if (version.0, version.1) < min {
        return Err(InstallerError::PythonTooOld {
            found: format!("{}.{}.{}", version.0, version.1, version.2),
            required,
        });
    }

    debug!(?version, "Python version ok");
    Ok(format!("{}.{}.{}", version.0, version.1, version.2))
}

/// `Python 3.9.2` -> (3, 9, 2)
pub fn parse_python_version(text: &str) -> Option<(u32, u32, u32)> {
    let version = text.trim().strip_prefix("Python")?.trim();
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts
        .next()
        .map(|p| p.chars().take_while(char::is_ascii_digit).collect::<String>())
        .and_then(|p| p.parse().ok())
        .unwrap_or(0);
    Some((major, minor, patch))
}

/// SHA-256 of a requirements file, `None` if it does not exist
pub async fn requirements_digest(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(hex::encode(Sha256::digest(&bytes)))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// `<venv>/bin/pip install -r <requirements>`
pub async fn install_requirements(
    runner: &dyn CommandRunner,
    pip: &Path,
    requirements: &Path,
) -> Result<()> {
    info!(requirements = %requirements.display(), "Reinstalling python dependencies");
    let spec = CommandSpec::new(pip.to_string_lossy())
        .arg("install")
        .arg("-r")
        .arg(requirements);
    runner.run_checked(&spec).await?;
    Ok(())
}

use std::path::Path;
use tracing::debug;

use crate::error::{InstallerError, Result};
use crate::executor::{CommandRunner, CommandSpec};

pub async fn clone(runner: &dyn CommandRunner, url: &str, dest: &Path) -> Result<()> {
    let spec = CommandSpec::new("git").arg("clone").arg(url).arg(dest);
    let output = runner.run(&spec).await?;

    if !output.success {
        return Err(InstallerError::CloneFailed {
            url: url.to_string(),
            reason: output.stderr.trim().to_string(),
        });
    }
    debug!(url, dest = %dest.display(), "Cloned repository");
    Ok(())
}

/// `git pull --force origin <branch>`
pub async fn pull_force(runner: &dyn CommandRunner, repo: &Path, branch: &str) -> Result<()> {
    let spec = CommandSpec::new("git")
        .args(["pull", "--force", "origin", branch, "-q"])
        .current_dir(repo);
    runner.run_checked(&spec).await?;
    Ok(())
}

/// `git checkout -f <branch>`
pub async fn checkout_force(runner: &dyn CommandRunner, repo: &Path, branch: &str) -> Result<()> {
    let spec = CommandSpec::new("git")
        .args(["checkout", "-f", branch])
        .current_dir(repo);
    runner.run_checked(&spec).await?;
    Ok(())
}

async fn describe(runner: &dyn CommandRunner, repo: &Path, rev: &str) -> Result<String> {
    let spec = CommandSpec::new("git")
        .args(["describe", rev, "--always", "--tags"])
        .current_dir(repo);
    let output = runner.run_checked(&spec).await?;
    Ok(short_version(output.stdout.trim()))
}

/// Version of the checked-out commit
pub async fn local_version(runner: &dyn CommandRunner, repo: &Path) -> Result<String> {
    describe(runner, repo, "HEAD").await
}

/// Fetches origin, then describes `origin/<branch>`
pub async fn remote_version(runner: &dyn CommandRunner, repo: &Path, branch: &str) -> Result<String> {
    let fetch = CommandSpec::new("git")
        .args(["fetch", "origin", "-q"])
        .current_dir(repo);
    runner.run_checked(&fetch).await?;

    describe(runner, repo, &format!("origin/{}", branch)).await
}

/// Keeps tag and commit count of a `git describe` string:
/// `v0.3.1-12-g3f2a9c1` -> `v0.3.1-12`.
pub fn short_version(describe: &str) -> String {
    describe.split('-').take(2).collect::<Vec<_>>().join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::FakeRunner;
    use std::path::PathBuf;

    #[test]
    fn test_short_version() {
        assert_eq!(short_version("v0.3.1-12-g3f2a9c1"), "v0.3.1-12");
        assert_eq!(short_version("v0.3.1"), "v0.3.1");
        assert_eq!(short_version("3f2a9c1"), "3f2a9c1");
        assert_eq!(short_version(""), "");
    }

    #[tokio::test]
    async fn test_clone_failure() {
        let runner = FakeRunner::new().fail("git clone", "Could not resolve host");
        let err = clone(&runner, "https://example.com/x.git", Path::new("/tmp/x"))
            .await
            .unwrap_err();

        match err {
            InstallerError::CloneFailed { url, reason } => {
                assert_eq!(url, "https://example.com/x.git");
                assert_eq!(reason, "Could not resolve host");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_remote_version_fetches_first() {
        let runner = FakeRunner::new()
            .respond("git describe origin/master", "v1.2.0-4-gabcdef0\n");
        let repo = PathBuf::from("/home/pi/SwierVision");

        let version = remote_version(&runner, &repo, "master").await.unwrap();

        assert_eq!(version, "v1.2.0-4");
        assert_eq!(
            runner.calls(),
            vec![
                "git fetch origin -q",
                "git describe origin/master --always --tags"
            ]
        );
        assert!(runner.specs().iter().all(|s| s.cwd.as_ref() == Some(&repo)));
    }
}

//! Copies of the printer configuration and of the plugin checkout.
//!
//! Backups land in `<backup_dir>/<name>/<timestamp>/` and are never
//! pruned.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{InstallerError, Result};
use crate::paths::Paths;

fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d-%H%M%S").to_string()
}

/// Backs up the `config` directory of every printer data directory.
/// Returns the backup location, or `None` when there was nothing to copy.
pub async fn backup_config_dir(paths: &Paths) -> Result<Option<PathBuf>> {
    let sources = paths.printer_data_dirs();
    if sources.is_empty() {
        debug!("No printer config directories found, skipping backup");
        return Ok(None);
    }

    let target = paths.backup_dir.join("configs").join(timestamp());
    for data_dir in sources {
        let name = data_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        copy_dir(data_dir.join("config"), target.join(name)).await?;
    }

    info!(target = %target.display(), "Backed up printer configuration");
    Ok(Some(target))
}

/// Copies `source` to `<backup_dir>/<name>/<timestamp>` when `enabled`.
pub async fn backup_before_update(
    paths: &Paths,
    name: &str,
    source: &Path,
    enabled: bool,
) -> Result<Option<PathBuf>> {
    if !enabled {
        debug!(name, "Backup before update disabled");
        return Ok(None);
    }
    if !source.is_dir() {
        return Ok(None);
    }

    let target = paths.backup_dir.join(name).join(timestamp());
    copy_dir(source.to_path_buf(), target.clone()).await?;

    info!(name, target = %target.display(), "Backed up before update");
    Ok(Some(target))
}

async fn copy_dir(source: PathBuf, target: PathBuf) -> Result<()> {
    tokio::task::spawn_blocking(move || copy_dir_blocking(&source, &target))
        .await
        .map_err(|e| InstallerError::Backup(e.to_string()))?
}

fn copy_dir_blocking(source: &Path, target: &Path) -> Result<()> {
    fs::create_dir_all(target)?;

    for entry in WalkDir::new(source).min_depth(1).follow_links(false) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| InstallerError::Backup(e.to_string()))?;
        let dest = target.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&dest)?;
        } else if file_type.is_symlink() {
            #[cfg(unix)]
            std::os::unix::fs::symlink(fs::read_link(entry.path())?, &dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project_config::ProjectConfig;

    fn paths_in(home: &Path) -> Paths {
        Paths::from_home(home, &ProjectConfig::get().plugin)
    }

    #[tokio::test]
    async fn test_backup_config_dir() {
        let home = tempfile::tempdir().unwrap();
        let config = home.path().join("printer_data").join("config");
        fs::create_dir_all(config.join("macros")).unwrap();
        fs::write(config.join("printer.cfg"), "[printer]\n").unwrap();
        fs::write(config.join("macros").join("start.cfg"), "[gcode_macro START]\n").unwrap();

        let paths = paths_in(home.path());
        let target = backup_config_dir(&paths).await.unwrap().unwrap();

        assert!(target.starts_with(&paths.backup_dir));
        let copied = target.join("printer_data");
        assert_eq!(
            fs::read_to_string(copied.join("printer.cfg")).unwrap(),
            "[printer]\n"
        );
        assert!(copied.join("macros").join("start.cfg").is_file());
    }

    #[tokio::test]
    async fn test_nothing_to_back_up() {
        let home = tempfile::tempdir().unwrap();
        let paths = paths_in(home.path());
        assert!(backup_config_dir(&paths).await.unwrap().is_none());
        assert!(!paths.backup_dir.exists());
    }

    #[tokio::test]
    async fn test_backup_before_update() {
        let home = tempfile::tempdir().unwrap();
        let paths = paths_in(home.path());
        fs::create_dir_all(&paths.install_dir).unwrap();
        fs::write(paths.install_dir.join("screen.py"), "print()\n").unwrap();

        let skipped = backup_before_update(&paths, "swiervision", &paths.install_dir, false)
            .await
            .unwrap();
        assert!(skipped.is_none());

        let target = backup_before_update(&paths, "swiervision", &paths.install_dir, true)
            .await
            .unwrap()
            .unwrap();
        assert!(target.join("screen.py").is_file());
        assert!(target.starts_with(paths.backup_dir.join("swiervision")));
    }
}

//! Registers the plugin with Moonraker's update manager by appending an
//! `[update_manager <name>]` section to every `moonraker.conf` found.

use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::Result;

/// The section appended to Moonraker configs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateManagerEntry {
    pub name: String,
    pub path: PathBuf,
    pub origin: String,
    pub env: PathBuf,
    pub requirements: String,
    pub install_script: String,
}

impl UpdateManagerEntry {
    pub fn header(&self) -> String {
        format!("[update_manager {}]", self.name)
    }

    pub fn render(&self) -> String {
        format!(
            "{}\ntype: git_repo\npath: {}\norigin: {}\nenv: {}\nrequirements: {}\ninstall_script: {}\n",
            self.header(),
            self.path.display(),
            self.origin,
            self.env.display(),
            self.requirements,
            self.install_script,
        )
    }

    fn header_pattern(&self) -> Regex {
        Regex::new(&format!(r"(?m)^{}", regex::escape(&self.header())))
            .expect("escaped header is a valid regex")
    }

    pub fn is_registered(&self, content: &str) -> bool {
        self.header_pattern().is_match(content)
    }

    /// New file content with the section appended, or `None` if already present.
    pub fn patch(&self, content: &str) -> Option<String> {
        self.patch_bytes(content.as_bytes())
            .map(|patched| String::from_utf8_lossy(&patched).into_owned())
    }

    /// Byte-level variant; bytes that are not UTF-8 are kept as they are.
    pub fn patch_bytes(&self, content: &[u8]) -> Option<Vec<u8>> {
        if self.is_registered(&String::from_utf8_lossy(content)) {
            return None;
        }

        let rendered = self.render();
        let mut patched = Vec::with_capacity(content.len() + rendered.len() + 1);
        patched.extend_from_slice(content);
        if !patched.ends_with(b"\n") {
            patched.push(b'\n');
        }
        patched.extend_from_slice(rendered.as_bytes());
        Some(patched)
    }
}

#[derive(Debug, Default)]
pub struct PatchReport {
    pub patched: Vec<PathBuf>,
    pub already_registered: Vec<PathBuf>,
    /// Files that could not be read or written, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl PatchReport {
    pub fn any_patched(&self) -> bool {
        !self.patched.is_empty()
    }
}

/// Files called `file_name` below `root`, at most `max_depth` levels down.
pub fn find_config_files(root: &Path, file_name: &str, max_depth: usize) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

pub async fn patch_file(path: &Path, entry: &UpdateManagerEntry) -> Result<bool> {
    let content = tokio::fs::read(path).await?;
    match entry.patch_bytes(&content) {
        Some(patched) => {
            tokio::fs::write(path, patched).await?;
            info!(file = %path.display(), section = %entry.header(), "Registered update manager entry");
            Ok(true)
        }
        None => {
            debug!(file = %path.display(), "Update manager entry already present");
            Ok(false)
        }
    }
}

/// Patches every file independently; a file that fails is recorded and skipped.
pub async fn patch_all(files: &[PathBuf], entry: &UpdateManagerEntry) -> PatchReport {
    let mut report = PatchReport::default();
    for file in files {
        match patch_file(file, entry).await {
            Ok(true) => report.patched.push(file.clone()),
            Ok(false) => report.already_registered.push(file.clone()),
            Err(e) => {
                warn!(file = %file.display(), "Skipping update manager registration: {}", e);
                report.failed.push((file.clone(), e.to_string()));
            }
        }
    }
    report
}

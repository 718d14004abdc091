use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallerError {
    #[error("Component not found: {name} (available: {available})")]
    ComponentNotFound { name: String, available: String },

    #[error("{0} is not installed")]
    NotInstalled(String),

    #[error("Python {required} or newer is required, found {found}")]
    PythonTooOld { found: String, required: String },

    #[error("{component} requires {dependency}, which is not installed")]
    DependencyMissing {
        component: String,
        dependency: String,
    },

    #[error("Cloning {url} failed: {reason}")]
    CloneFailed { url: String, reason: String },

    #[error("Install script {} failed: {reason}", script.display())]
    InstallScriptFailed { script: PathBuf, reason: String },

    #[error("Command `{command}` failed ({}): {stderr}", exit_code_label(*code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("systemctl {action} {unit} failed: {reason}")]
    Service {
        action: String,
        unit: String,
        reason: String,
    },

    #[error("Backup failed: {0}")]
    Backup(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("{0}")]
    Other(String),
}

fn exit_code_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, InstallerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_message() {
        let err = InstallerError::CommandFailed {
            command: "git pull".into(),
            code: Some(128),
            stderr: "fatal: not a git repository".into(),
        };
        assert_eq!(
            err.to_string(),
            "Command `git pull` failed (exit code 128): fatal: not a git repository"
        );

        let err = InstallerError::CommandFailed {
            command: "pip".into(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}

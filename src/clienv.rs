use std::path::PathBuf;

#[derive(Debug, Clone, Copy)]
pub enum EnvVar {
    ConfigDir,
    Home,
    Log,
}

impl EnvVar {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigDir => "SWIERCTL_CONFIG_DIR",
            Self::Home => "SWIERCTL_HOME",
            Self::Log => "SWIERCTL_LOG",
        }
    }
}

const FALLBACK_CONFIG_DIR: &str = "~/.config";
const SWIERCTL_SUBDIR: &str = "swierctl";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Non-empty value of an environment variable
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Config directory ($SWIERCTL_CONFIG_DIR or ~/.config/swierctl)
pub fn config_dir() -> PathBuf {
    let dir = env_opt(EnvVar::ConfigDir.as_str())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from(FALLBACK_CONFIG_DIR))
                .join(SWIERCTL_SUBDIR)
        });
    tracing::trace!(dir = %dir.display(), "Resolved config directory");
    dir
}

/// Home directory override ($SWIERCTL_HOME)
pub fn home_override() -> Option<PathBuf> {
    let dir = env_opt(EnvVar::Home.as_str()).map(PathBuf::from);
    tracing::trace!(dir = ?dir, "SWIERCTL_HOME env var");
    dir
}

/// Log filter directive ($SWIERCTL_LOG or "warn")
pub fn log_filter() -> String {
    env_opt(EnvVar::Log.as_str()).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

/// Whether the current process already runs as root
pub fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    {
        false
    }
}

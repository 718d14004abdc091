use serde::Deserialize;
use std::sync::OnceLock;

static PROJECT_CONFIG: OnceLock<ProjectConfig> = OnceLock::new();

const CONFIG_TOML: &str = include_str!("../config.toml");

#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    pub plugin: PluginConfig,
    pub companion: CompanionConfig,
}

/// Fixed facts about the managed plugin.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginConfig {
    pub name: String,
    pub origin: String,
    pub branch: String,
    pub service: String,
    /// Relative to the home directory
    pub install_dir: String,
    /// Relative to the home directory
    pub env_dir: String,
    /// Relative to the install directory
    pub requirements: String,
    /// Relative to the install directory
    pub install_script: String,
    pub log_file: String,
    pub min_python: String,
    #[serde(default)]
    pub packages: Vec<String>,
}

/// The daemon whose update manager tracks the plugin (Moonraker).
#[derive(Debug, Clone, Deserialize)]
pub struct CompanionConfig {
    pub service: String,
    pub config_file: String,
    pub search_depth: usize,
}

impl ProjectConfig {
    pub fn get() -> &'static ProjectConfig {
        PROJECT_CONFIG
            .get_or_init(|| toml::from_str(CONFIG_TOML).expect("Failed to parse config.toml"))
    }
}

impl PluginConfig {
    /// Minimum interpreter version as (major, minor)
    pub fn min_python_version(&self) -> Option<(u32, u32)> {
        let mut parts = self.min_python.split('.');
        let major = parts.next()?.trim().parse().ok()?;
        let minor = parts.next().unwrap_or("0").trim().parse().ok()?;
        Some((major, minor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_constants() {
        let plugin = &ProjectConfig::get().plugin;
        assert_eq!(plugin.origin, "https://github.com/SYNCRAFT-GITHUB/SwierVision.git");
        assert_eq!(plugin.requirements, "scripts/SwierVision-requirements.txt");
        assert_eq!(plugin.install_script, "scripts/SwierVision-install.sh");
        assert_eq!(plugin.min_python_version(), Some((3, 7)));
    }

    #[test]
    fn test_companion_constants() {
        let companion = &ProjectConfig::get().companion;
        assert_eq!(companion.service, "moonraker");
        assert_eq!(companion.config_file, "moonraker.conf");
    }
}

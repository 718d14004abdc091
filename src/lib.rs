pub mod backup;
pub mod clienv;
pub mod completions;
pub mod component;
pub mod components;
pub mod deps;
pub mod error;
pub mod executor;
pub mod git;
pub mod installer;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod project_config;
pub mod python;
pub mod registry;
pub mod systemd;
pub mod update_manager;
pub mod updates;
pub mod user_config;

pub use error::{InstallerError, Result};
pub use installer::Installer;

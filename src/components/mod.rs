pub mod swiervision;

pub use swiervision::SwierVision;

use std::sync::Arc;

use crate::error::Result;
use crate::executor::SystemRunner;
use crate::paths::Paths;
use crate::project_config::ProjectConfig;
use crate::registry::ComponentRegistry;
use crate::user_config::UserConfig;

/// Creates the default component registry from the user's settings
pub fn create_default_registry(user: &UserConfig) -> Result<ComponentRegistry> {
    let paths = Paths::resolve(user, &ProjectConfig::get().plugin)?;
    let options = swiervision::Options {
        backup_before_update: user.backup_before_update(),
        use_sudo: user.use_sudo(),
    };
    let runner = Arc::new(SystemRunner::new(options.use_sudo));

    let mut registry = ComponentRegistry::new();
    registry.register(Box::new(SwierVision::new(paths, options, runner)));
    Ok(registry)
}

pub(crate) mod completions;
pub(crate) mod config;
pub(crate) mod lifecycle;
pub(crate) mod status;

use swierctl::components::create_default_registry;
use swierctl::installer::Installer;
use swierctl::user_config::UserConfig;

pub(crate) fn load_installer() -> anyhow::Result<Installer> {
    let user = UserConfig::load()?;
    Ok(Installer::new(create_default_registry(&user)?))
}

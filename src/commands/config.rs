use swierctl::out_success;
use swierctl::paths::Paths;
use swierctl::project_config::ProjectConfig;
use swierctl::user_config::UserConfig;

pub(crate) fn cmd_config(init: bool) -> anyhow::Result<()> {
    let path = UserConfig::config_path();
    let user = UserConfig::load()?;

    if init && !path.exists() {
        let paths = Paths::resolve(&user, &ProjectConfig::get().plugin)?;
        let seeded = UserConfig {
            home: Some(paths.home),
            install_dir: Some(paths.install_dir),
            env_dir: Some(paths.env_dir),
            systemd_dir: Some(paths.systemd_dir),
            log_file: Some(paths.log_file),
            backup_dir: Some(paths.backup_dir),
            backup_before_update: Some(user.backup_before_update()),
            use_sudo: Some(user.use_sudo.unwrap_or(true)),
        };
        seeded.save_to(&path)?;
        out_success!("Wrote {}", path.display());
    }

    println!("# {}", path.display());
    let user = UserConfig::load()?;
    let paths = Paths::resolve(&user, &ProjectConfig::get().plugin)?;
    println!("{}", toml::to_string_pretty(&paths)?);
    println!("backup_before_update = {}", user.backup_before_update());
    println!("use_sudo = {}", user.use_sudo());
    Ok(())
}

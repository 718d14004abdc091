use dialoguer::{theme::ColorfulTheme, Confirm};
use swierctl::component::InstallConfig;
use swierctl::installer::Installer;
use swierctl::updates::ApplicationUpdates;
use swierctl::{out_confirm, out_info, out_success, out_warn};

pub(crate) async fn cmd_install(installer: &Installer, component: &str, yes: bool) -> anyhow::Result<()> {
    let name = installer.registry().get(component)?.info().name.clone();
    out_info!("Initializing {} installation ...", name);

    installer
        .install(component, &InstallConfig { assume_yes: yes })
        .await?;

    out_confirm!("{} has been set up!", name);
    Ok(())
}

pub(crate) async fn cmd_remove(installer: &Installer, component: &str, yes: bool) -> anyhow::Result<()> {
    let name = installer.registry().get(component)?.info().name.clone();

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Remove {} and its virtual environment?", name))
            .default(false)
            .interact()?;

        if !confirmed {
            out_info!("Removal cancelled");
            return Ok(());
        }
    }

    installer.uninstall(component).await?;

    out_confirm!("{} was successfully removed!", name);
    Ok(())
}

pub(crate) async fn cmd_update(installer: &Installer, component: &str) -> anyhow::Result<()> {
    let name = installer.registry().get(component)?.info().name.clone();
    out_info!("Updating {} ...", name);

    installer.update(component, &InstallConfig::default()).await?;

    out_success!("{} updated", name);
    Ok(())
}

/// Updates every component whose remote version moved on
pub(crate) async fn cmd_update_all(installer: &Installer) -> anyhow::Result<()> {
    let mut updates = ApplicationUpdates::new();
    installer.report(&mut updates).await?;

    if updates.is_empty() {
        out_success!("Everything is up to date");
        return Ok(());
    }

    let mut failed = 0;
    for id in updates.names() {
        if let Err(e) = cmd_update(installer, id).await {
            out_warn!("Updating {} failed: {}", id, e);
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("{} update(s) failed", failed);
    }
    Ok(())
}

pub(crate) async fn cmd_register(installer: &Installer, component: &str) -> anyhow::Result<()> {
    let patched = installer.register_updates(component).await?;

    if patched.is_empty() {
        out_info!("Update manager already configured, nothing to do");
    } else {
        for file in &patched {
            out_success!("Registered in {}", file.display());
        }
    }
    Ok(())
}

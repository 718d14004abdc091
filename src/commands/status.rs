use console::style;
use swierctl::component::InstallStatus;
use swierctl::installer::Installer;
use swierctl::updates::ApplicationUpdates;

pub(crate) async fn cmd_status(installer: &Installer, json: bool) -> anyhow::Result<()> {
    let mut updates = ApplicationUpdates::new();
    let reports = installer.report(&mut updates).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        let status = match report.status {
            InstallStatus::Installed => style(report.status.to_string()).green(),
            InstallStatus::NotInstalled => style(report.status.to_string()).red(),
            InstallStatus::Incomplete => style(report.status.to_string()).yellow(),
        };
        let local = report.version.local.as_deref().unwrap_or("-");
        let remote = report.version.remote.as_deref().unwrap_or("-");
        let remote = if report.update_available {
            style(remote.to_string()).green().bold()
        } else {
            style(remote.to_string())
        };

        println!(
            "{:<14} {:<16} local: {:<14} remote: {}",
            style(&report.name).bold(),
            status,
            local,
            remote
        );
    }

    if !updates.is_empty() {
        println!();
        println!(
            "Updates available: {}",
            updates.names().collect::<Vec<_>>().join(", ")
        );
    }
    Ok(())
}

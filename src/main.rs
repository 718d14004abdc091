mod args;
mod commands;

use args::{Cli, Commands};
use clap::Parser;
use swierctl::out_error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(swierctl::clienv::log_filter())
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        out_error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Install { component, yes } => {
            let installer = commands::load_installer()?;
            commands::lifecycle::cmd_install(&installer, &component, yes).await?
        }
        Commands::Remove { component, yes } => {
            let installer = commands::load_installer()?;
            commands::lifecycle::cmd_remove(&installer, &component, yes).await?
        }
        Commands::Update { component, all } => {
            let installer = commands::load_installer()?;
            if all {
                commands::lifecycle::cmd_update_all(&installer).await?
            } else {
                commands::lifecycle::cmd_update(&installer, &component).await?
            }
        }
        Commands::Status { json } => {
            let installer = commands::load_installer()?;
            commands::status::cmd_status(&installer, json).await?
        }
        Commands::Register { component } => {
            let installer = commands::load_installer()?;
            commands::lifecycle::cmd_register(&installer, &component).await?
        }
        Commands::Config { init } => commands::config::cmd_config(init)?,
        Commands::Completions { shell } => commands::completions::cmd_completions(shell),
        Commands::Init { shell } => commands::completions::cmd_init(shell)?,
    }

    Ok(())
}

use clap::{Parser, Subcommand};
use swierctl::completions::CompletionShell;

const DEFAULT_COMPONENT: &str = "swiervision";

#[derive(Parser)]
#[command(name = "swierctl")]
#[command(version)]
#[command(about = "Install, update and remove SwierVision on a Klipper host", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Clone and install a component (replaces an existing checkout)
    Install {
        #[arg(default_value = DEFAULT_COMPONENT)]
        component: String,

        /// Install missing system packages without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove a component, its virtualenv, service and logs
    Remove {
        #[arg(default_value = DEFAULT_COMPONENT)]
        component: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Pull the latest version of a component
    Update {
        #[arg(default_value = DEFAULT_COMPONENT)]
        component: String,

        /// Update every component that has a newer remote version
        #[arg(long, conflicts_with = "component")]
        all: bool,
    },

    /// Show install state and versions
    Status {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register a component with Moonraker's update manager
    Register {
        #[arg(default_value = DEFAULT_COMPONENT)]
        component: String,
    },

    /// Show or create the settings file
    Config {
        /// Write a settings file with the current values if none exists
        #[arg(long)]
        init: bool,
    },

    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: CompletionShell,
    },

    /// Install shell completions for the current shell
    Init {
        #[arg(value_enum)]
        shell: Option<CompletionShell>,
    },
}

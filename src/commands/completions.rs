use swierctl::completions::{self, CompletionShell};
use swierctl::{out_info, out_success};

use crate::args::Cli;

const BIN_NAME: &str = "swierctl";

pub(crate) fn cmd_completions(shell: CompletionShell) {
    completions::generate_completions::<Cli>(shell, BIN_NAME, &mut std::io::stdout());
}

pub(crate) fn cmd_init(shell: Option<CompletionShell>) -> anyhow::Result<()> {
    let shell = shell
        .or_else(completions::detect_shell)
        .ok_or_else(|| anyhow::anyhow!("Could not detect your shell, pass it explicitly"))?;
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;

    let path = completions::init_completions::<Cli>(shell, BIN_NAME, &home)?;

    out_success!("Completions written to {}", path.display());
    out_info!("Restart your shell to enable them");
    Ok(())
}

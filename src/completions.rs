//! Shell completion generation and installation.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, ValueEnum};
use clap_complete::{generate, Shell};

const RC_MARKER: &str = "# swierctl completions";

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
        }
    }
}

/// Writes completions for `shell` to `out`.
pub fn generate_completions<C: CommandFactory>(
    shell: CompletionShell,
    bin_name: &str,
    out: &mut dyn Write,
) {
    let mut cmd = C::command();
    generate(Shell::from(shell), &mut cmd, bin_name, out);
}

/// Detect the current shell from environment.
pub fn detect_shell() -> Option<CompletionShell> {
    let shell = std::env::var("SHELL").ok()?;
    if shell.contains("zsh") {
        Some(CompletionShell::Zsh)
    } else if shell.contains("bash") {
        Some(CompletionShell::Bash)
    } else if shell.contains("fish") {
        Some(CompletionShell::Fish)
    } else {
        None
    }
}

pub fn completion_filename(shell: CompletionShell, bin_name: &str) -> String {
    match shell {
        CompletionShell::Bash => format!("{}.bash", bin_name),
        CompletionShell::Zsh => format!("_{}", bin_name),
        CompletionShell::Fish => format!("{}.fish", bin_name),
    }
}

fn completions_dir(shell: CompletionShell, home: &Path) -> PathBuf {
    match shell {
        CompletionShell::Bash => home.join(".local/share/bash-completion/completions"),
        CompletionShell::Zsh => home.join(".zfunc"),
        CompletionShell::Fish => home.join(".config/fish/completions"),
    }
}

fn rc_snippet(shell: CompletionShell, completion_file: &Path) -> Option<String> {
    match shell {
        CompletionShell::Bash => Some(format!(
            "\n{}\nsource \"{}\"\n",
            RC_MARKER,
            completion_file.display()
        )),
        CompletionShell::Zsh => Some(format!(
            "\n{}\nfpath=(~/.zfunc $fpath)\nautoload -Uz compinit && compinit\n",
            RC_MARKER
        )),
        // fish loads ~/.config/fish/completions on its own
        CompletionShell::Fish => None,
    }
}

fn rc_file(shell: CompletionShell, home: &Path) -> Option<PathBuf> {
    match shell {
        CompletionShell::Bash => Some(home.join(".bashrc")),
        CompletionShell::Zsh => Some(home.join(".zshrc")),
        CompletionShell::Fish => None,
    }
}

/// Writes the completion file below `home` and hooks it into the shell rc
/// file once. Returns the completion file path.
pub fn init_completions<C: CommandFactory>(
    shell: CompletionShell,
    bin_name: &str,
    home: &Path,
) -> anyhow::Result<PathBuf> {
    let dir = completions_dir(shell, home);
    std::fs::create_dir_all(&dir)?;

    let completion_file = dir.join(completion_filename(shell, bin_name));
    let mut file = std::fs::File::create(&completion_file)?;
    generate_completions::<C>(shell, bin_name, &mut file);

    if let (Some(rc), Some(snippet)) = (rc_file(shell, home), rc_snippet(shell, &completion_file)) {
        let existing = std::fs::read_to_string(&rc).unwrap_or_default();
        if !existing.contains(RC_MARKER) {
            let mut rc_handle = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&rc)?;
            write!(rc_handle, "{}", snippet)?;
        }
    }

    tracing::debug!(file = %completion_file.display(), "Installed completions");
    Ok(completion_file)
}

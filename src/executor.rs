use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{InstallerError, Result};

/// One external command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Needs root (systemctl, apt-get, removing unit files)
    pub privileged: bool,
    /// Inherit the terminal instead of capturing output
    pub interactive: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            privileged: false,
            interactive: false,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<std::ffi::OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }

    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Command line as typed in a shell, without any sudo prefix
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Turn a non-zero exit into [`InstallerError::CommandFailed`]
    pub fn check(self, spec: &CommandSpec) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(InstallerError::CommandFailed {
                command: spec.display(),
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Seam between the installer and the processes it drives.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs to completion. A non-zero exit is reported in the output, not as `Err`.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Like [`CommandRunner::run`] but fails on a non-zero exit
    async fn run_checked(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.run(spec).await?.check(spec)
    }
}

/// Runs commands on the host, prefixing privileged ones with `sudo`.
pub struct SystemRunner {
    use_sudo: bool,
}

impl SystemRunner {
    pub fn new(use_sudo: bool) -> Self {
        Self { use_sudo }
    }

    fn build(&self, spec: &CommandSpec) -> Command {
        let mut cmd = if spec.privileged && self.use_sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg(&spec.program);
            cmd
        } else {
            Command::new(&spec.program)
        };
        cmd.args(&spec.args);

        if let Some(ref dir) = spec.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!(
            command = %spec.display(),
            privileged = spec.privileged,
            cwd = ?spec.cwd,
            "Running command"
        );

        let mut cmd = self.build(spec);

        let output = if spec.interactive {
            let status = cmd
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .await?;
            CommandOutput {
                success: status.success(),
                code: status.code(),
                ..Default::default()
            }
        } else {
            let output = cmd.stdin(Stdio::null()).output().await?;
            CommandOutput {
                success: output.status.success(),
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
        };

        debug!(code = ?output.code, "Command finished");
        Ok(output)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    type Effect = Box<dyn Fn(&CommandSpec) + Send + Sync>;

    struct Rule {
        prefix: String,
        output: CommandOutput,
        effect: Option<Effect>,
        spawn_error: Option<std::io::ErrorKind>,
    }

    /// Records every command and answers from scripted rules matched by
    /// command-line prefix. Unmatched commands succeed with empty output.
    #[derive(Default)]
    pub(crate) struct FakeRunner {
        rules: Vec<Rule>,
        calls: Mutex<Vec<CommandSpec>>,
    }

    impl FakeRunner {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn respond(mut self, prefix: &str, stdout: &str) -> Self {
            self.rules.push(Rule {
                prefix: prefix.to_string(),
                output: CommandOutput {
                    success: true,
                    code: Some(0),
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                },
                effect: None,
                spawn_error: None,
            });
            self
        }

        pub(crate) fn fail(mut self, prefix: &str, stderr: &str) -> Self {
            self.rules.push(Rule {
                prefix: prefix.to_string(),
                output: CommandOutput {
                    success: false,
                    code: Some(1),
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                },
                effect: None,
                spawn_error: None,
            });
            self
        }

        pub(crate) fn on(
            mut self,
            prefix: &str,
            effect: impl Fn(&CommandSpec) + Send + Sync + 'static,
        ) -> Self {
            self.rules.push(Rule {
                prefix: prefix.to_string(),
                output: CommandOutput {
                    success: true,
                    code: Some(0),
                    ..Default::default()
                },
                effect: Some(Box::new(effect)),
                spawn_error: None,
            });
            self
        }

        /// The program cannot be spawned, as if it were not installed.
        pub(crate) fn missing(mut self, prefix: &str) -> Self {
            self.rules.push(Rule {
                prefix: prefix.to_string(),
                output: CommandOutput::default(),
                effect: None,
                spawn_error: Some(std::io::ErrorKind::NotFound),
            });
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(CommandSpec::display)
                .collect()
        }

        pub(crate) fn specs(&self) -> Vec<CommandSpec> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn called(&self, prefix: &str) -> bool {
            self.calls().iter().any(|c| c.starts_with(prefix))
        }
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push(spec.clone());
            let line = spec.display();

            match self.rules.iter().find(|r| line.starts_with(&r.prefix)) {
                Some(rule) => {
                    if let Some(kind) = rule.spawn_error {
                        return Err(std::io::Error::from(kind).into());
                    }
                    if let Some(effect) = &rule.effect {
                        effect(spec);
                    }
                    Ok(rule.output.clone())
                }
                None => Ok(CommandOutput {
                    success: true,
                    code: Some(0),
                    ..Default::default()
                }),
            }
        }
    }
}

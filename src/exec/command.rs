// src/exec/command.rs

//! Tasks declared in the config file.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::Context;
use thiserror::Error;
use tracing::debug;

use crate::errors::DomainError;
use crate::target::Target;
use crate::task::{Runnable, Task, TaskContext, TaskId, TaskRef};

/// Capability tag of config tasks with a `cmd`.
pub const COMMAND_TAG: &str = "command";
/// Capability tag of config tasks without a `cmd`.
pub const EXTERNAL_TAG: &str = "external";

const COMMAND_ANCESTORS: &[&str] = &[COMMAND_TAG];
const EXTERNAL_ANCESTORS: &[&str] = &[EXTERNAL_TAG];

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("command for {task} exited with code {code}")]
    NonZeroExit { task: String, code: i32 },

    #[error("command for {task} was terminated by a signal")]
    Terminated { task: String },

    #[error("command for {task} succeeded but did not produce {path:?}")]
    OutputNotProduced { task: String, path: PathBuf },
}

/// A task whose body is a shell command and whose output is a file.
#[derive(Debug)]
pub struct CommandTask {
    id: TaskId,
    cmd: Option<String>,
    output: Option<Target>,
    requires: Vec<TaskRef>,
    workdir: PathBuf,
}

impl CommandTask {
    pub fn new(
        id: TaskId,
        cmd: Option<String>,
        output: Option<Target>,
        requires: Vec<TaskRef>,
        workdir: PathBuf,
    ) -> Self {
        Self {
            id,
            cmd,
            output,
            requires,
            workdir,
        }
    }

    pub fn cmd(&self) -> Option<&str> {
        self.cmd.as_deref()
    }
}

impl Task for CommandTask {
    fn id(&self) -> &TaskId {
        &self.id
    }

    fn ancestors(&self) -> &[&str] {
        if self.cmd.is_some() {
            COMMAND_ANCESTORS
        } else {
            EXTERNAL_ANCESTORS
        }
    }

    fn requires(&self) -> Vec<TaskRef> {
        self.requires.clone()
    }

    fn output(&self) -> Option<Target> {
        self.output.clone()
    }

    fn body(&self) -> Option<&dyn Runnable> {
        if self.cmd.is_some() { Some(self) } else { None }
    }
}

impl CommandTask {
    /// Remove whatever a failed command left at the output path, so the
    /// next build sees the task as missing instead of present.
    fn discard_output(&self) {
        let Some(target) = &self.output else {
            return;
        };
        match target.exists() {
            Ok(false) => {}
            Ok(true) => {
                debug!(task = %self.id, path = ?target.path(), "removing partial output");
                if let Err(err) = target.remove() {
                    debug!(task = %self.id, error = %err, "could not remove partial output");
                }
            }
            Err(err) => {
                debug!(task = %self.id, error = %err, "could not check partial output");
            }
        }
    }
}

impl Runnable for CommandTask {
    fn run(&self, _ctx: &TaskContext<'_>) -> Result<(), DomainError> {
        let Some(cmd) = self.cmd.as_deref() else {
            return Ok(());
        };
        if let Err(err) = run_shell(self, cmd) {
            self.discard_output();
            return Err(err);
        }

        if let Some(target) = &self.output {
            if !target.exists()? {
                return Err(DomainError::new(CommandError::OutputNotProduced {
                    task: self.id.to_string(),
                    path: target.path().to_path_buf(),
                }));
            }
        }
        Ok(())
    }
}

/// Run `cmd` through the platform shell and wait for it.
///
/// The task id and output path are exported as `LAZYDAG_TASK` and
/// `LAZYDAG_OUTPUT`. Captured stdout/stderr are logged at debug.
fn run_shell(task: &CommandTask, cmd: &str) -> Result<(), DomainError> {
    debug!(task = %task.id, cmd = %cmd, "starting task process");

    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .current_dir(&task.workdir)
        .env("LAZYDAG_TASK", task.id.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(target) = &task.output {
        command.env("LAZYDAG_OUTPUT", target.path());
    }

    let output = command
        .output()
        .with_context(|| format!("spawning process for {}", task.id))?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        debug!(task = %task.id, "stdout: {}", line);
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        debug!(task = %task.id, "stderr: {}", line);
    }

    let status = output.status;
    debug!(
        task = %task.id,
        exit_code = status.code().unwrap_or(-1),
        success = status.success(),
        "task process exited"
    );

    if status.success() {
        return Ok(());
    }

    match status.code() {
        Some(code) => Err(DomainError::new(CommandError::NonZeroExit {
            task: task.id.to_string(),
            code,
        })),
        None => Err(DomainError::new(CommandError::Terminated {
            task: task.id.to_string(),
        })),
    }
}

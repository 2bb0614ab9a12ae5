//! Version-control capability used by the clone executor.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::CloneError;

#[async_trait]
pub trait VersionControlClient: Send + Sync {
    /// Full clone of `url` into `destination`, which must not exist yet.
    async fn clone_repository(&self, url: &str, destination: &Path) -> Result<(), CloneError>;

    /// Bring an existing clone at `destination` up to date.
    async fn update(&self, destination: &Path) -> Result<(), CloneError>;
}

/// Shells out to the `git` binary.
///
/// Output is captured rather than inherited, and credential prompts are
/// disabled so a private repository fails instead of blocking the batch.
#[derive(Clone, Debug)]
pub struct GitCli {
    program: OsString,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, mut command: Command) -> Result<(), CloneError> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true);

        let output = command.output().await.map_err(|e| {
            CloneError::Unexpected(format!(
                "failed to run {}: {}",
                Path::new(&self.program).display(),
                e
            ))
        })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(CloneError::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[async_trait]
impl VersionControlClient for GitCli {
    async fn clone_repository(&self, url: &str, destination: &Path) -> Result<(), CloneError> {
        let (parent, dir_name) = match (destination.parent(), destination.file_name()) {
            (Some(parent), Some(dir_name)) => (parent, dir_name),
            _ => {
                return Err(CloneError::Unexpected(format!(
                    "cannot clone into {}",
                    destination.display()
                )))
            }
        };

        let mut command = Command::new(&self.program);
        command
            .arg("clone")
            .arg("--")
            .arg(url)
            .arg(dir_name)
            .current_dir(parent);

        self.run(command).await
    }

    async fn update(&self, destination: &Path) -> Result<(), CloneError> {
        let mut command = Command::new(&self.program);
        command
            .arg("-C")
            .arg(destination)
            .args(["pull", "--ff-only"]);

        self.run(command).await
    }
}

//! Per-repository clone execution.
//!
//! [`CloneExecutor::clone_one`] always returns a [`RepositoryResult`]: every
//! failure, including a panic inside the version-control client, is folded
//! into [`RepositoryOutcome::Failed`] so it cannot reach sibling repositories.

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::Instant;

use crate::config::ExistingPolicy;
use crate::error::CloneError;
use crate::event::{MirrorEvent, ReportSink};
use crate::outcome::{RepositoryOutcome, RepositoryResult, SkipReason};
use crate::repository::{is_safe_directory_name, RepositoryDescriptor};
use crate::vcs::VersionControlClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Clone,
    Update,
}

#[derive(Clone)]
pub struct CloneExecutor {
    vcs: Arc<dyn VersionControlClient>,
    sink: Arc<dyn ReportSink>,
    target_directory: PathBuf,
    on_existing: ExistingPolicy,
    clone_timeout: Option<Duration>,
}

impl CloneExecutor {
    pub fn new(
        vcs: Arc<dyn VersionControlClient>,
        sink: Arc<dyn ReportSink>,
        target_directory: impl Into<PathBuf>,
        on_existing: ExistingPolicy,
        clone_timeout: Option<Duration>,
    ) -> Self {
        Self {
            vcs,
            sink,
            target_directory: target_directory.into(),
            on_existing,
            clone_timeout,
        }
    }

    pub fn target_directory(&self) -> &Path {
        &self.target_directory
    }

    /// Clone (or skip, or update) one repository into its own subdirectory of
    /// the target directory.
    pub async fn clone_one(&self, repo: &RepositoryDescriptor) -> RepositoryResult {
        self.clone_before(repo, None).await
    }

    /// Like [`clone_one`](Self::clone_one), but gives up once `deadline` has
    /// passed. The per-clone timeout is clamped to the time remaining.
    pub async fn clone_before(
        &self,
        repo: &RepositoryDescriptor,
        deadline: Option<Instant>,
    ) -> RepositoryResult {
        let name = repo.display_name().to_string();
        let finish = |destination: Option<PathBuf>, outcome| RepositoryResult {
            name: name.clone(),
            destination,
            outcome,
        };

        let url = match repo.clone_url() {
            Some(url) => url,
            None => return finish(None, RepositoryOutcome::Skipped(SkipReason::NoCloneUrl)),
        };

        let dir_name = match repo.directory_name() {
            Some(dir_name) if is_safe_directory_name(&dir_name) => dir_name,
            other => {
                let invalid = CloneError::InvalidName(other.unwrap_or_default());
                return finish(None, RepositoryOutcome::Failed(invalid));
            }
        };
        let destination = self.target_directory.join(&dir_name);

        let operation = if tokio::fs::symlink_metadata(&destination).await.is_ok() {
            match self.on_existing {
                ExistingPolicy::Skip => {
                    return finish(
                        Some(destination),
                        RepositoryOutcome::Skipped(SkipReason::AlreadyPresent),
                    )
                }
                ExistingPolicy::Fail => {
                    let err = CloneError::DestinationExists(destination.clone());
                    return finish(Some(destination), RepositoryOutcome::Failed(err));
                }
                ExistingPolicy::Update => Operation::Update,
            }
        } else {
            Operation::Clone
        };

        let timeout = match remaining(self.clone_timeout, deadline) {
            Ok(timeout) => timeout,
            Err(err) => return finish(Some(destination), RepositoryOutcome::Failed(err)),
        };

        self.sink.report(&MirrorEvent::CloneStarted {
            name: name.clone(),
            clone_url: url.to_string(),
        });

        let outcome = match self.run(operation, url, &destination, timeout).await {
            Ok(()) if operation == Operation::Clone => RepositoryOutcome::Cloned,
            Ok(()) => RepositoryOutcome::Updated,
            Err(err) => {
                if operation == Operation::Clone && matches!(err, CloneError::TimedOut(_)) {
                    remove_partial_clone(&destination).await;
                }
                RepositoryOutcome::Failed(err)
            }
        };

        finish(Some(destination), outcome)
    }

    async fn run(
        &self,
        operation: Operation,
        url: &str,
        destination: &Path,
        timeout: Option<Duration>,
    ) -> Result<(), CloneError> {
        let attempt = async {
            match operation {
                Operation::Clone => self.vcs.clone_repository(url, destination).await,
                Operation::Update => self.vcs.update(destination).await,
            }
        };
        let attempt = AssertUnwindSafe(attempt).catch_unwind();

        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, attempt).await {
                Ok(result) => result,
                Err(_) => return Err(CloneError::TimedOut(limit)),
            },
            None => attempt.await,
        };

        result.unwrap_or_else(|panic| Err(CloneError::Unexpected(panic_message(&panic))))
    }
}

/// Time left for one clone, or `DeadlineExceeded` if none is.
fn remaining(
    clone_timeout: Option<Duration>,
    deadline: Option<Instant>,
) -> Result<Option<Duration>, CloneError> {
    let deadline = match deadline {
        Some(deadline) => deadline,
        None => return Ok(clone_timeout),
    };

    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        return Err(CloneError::DeadlineExceeded);
    }
    Ok(Some(clone_timeout.map_or(left, |timeout| timeout.min(left))))
}

async fn remove_partial_clone(destination: &Path) {
    if tokio::fs::symlink_metadata(destination).await.is_err() {
        return;
    }
    if let Err(e) = tokio::fs::remove_dir_all(destination).await {
        tracing::warn!(
            destination = %destination.display(),
            error = %e,
            "could not remove partial clone"
        );
    }
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

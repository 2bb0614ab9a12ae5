//! Outbound reporting for a mirror run.
//!
//! The pipeline emits [`MirrorEvent`]s into a [`ReportSink`] supplied at
//! construction time. [`TracingSink`] turns them into structured `tracing`
//! events; tests use closures to record them.

use std::path::PathBuf;

use crate::outcome::{BatchSummary, RepositoryOutcome, RepositoryResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorEvent {
    Started {
        username: String,
        base_url: String,
        target_directory: PathBuf,
    },
    DirectoryCreated {
        path: PathBuf,
    },
    FetchingRepositories {
        url: String,
    },
    RepositoriesListed {
        count: usize,
    },
    NoRepositories {
        username: String,
    },
    CloneStarted {
        name: String,
        clone_url: String,
    },
    RepositoryFinished(RepositoryResult),
    Finished(BatchSummary),
    /// A fatal error ended the run.
    Aborted {
        reason: String,
    },
}

/// Receiver of pipeline events.
pub trait ReportSink: Send + Sync {
    fn report(&self, event: &MirrorEvent);
}

impl<F> ReportSink for F
where
    F: Fn(&MirrorEvent) + Send + Sync,
{
    fn report(&self, event: &MirrorEvent) {
        self(event)
    }
}

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn report(&self, event: &MirrorEvent) {
        match event {
            MirrorEvent::Started {
                username,
                base_url,
                target_directory,
            } => tracing::info!(
                %username,
                %base_url,
                target_directory = %target_directory.display(),
                "starting mirror"
            ),
            MirrorEvent::DirectoryCreated { path } => {
                tracing::info!(path = %path.display(), "created directory")
            }
            MirrorEvent::FetchingRepositories { url } => {
                tracing::info!(%url, "fetching repository list")
            }
            MirrorEvent::RepositoriesListed { count } => {
                tracing::info!(count, "found repositories, starting clones")
            }
            MirrorEvent::NoRepositories { username } => {
                tracing::info!(%username, "no repositories found")
            }
            MirrorEvent::CloneStarted { name, clone_url } => {
                tracing::info!(repository = %name, %clone_url, "cloning")
            }
            MirrorEvent::RepositoryFinished(result) => log_result(result),
            MirrorEvent::Finished(summary) => tracing::info!(
                total = summary.total(),
                cloned = summary.cloned(),
                updated = summary.updated(),
                skipped = summary.skipped(),
                failed = summary.failed(),
                "mirror finished"
            ),
            MirrorEvent::Aborted { reason } => tracing::error!(%reason, "mirror aborted"),
        }
    }
}

fn log_result(result: &RepositoryResult) {
    let name = result.name.as_str();
    match &result.outcome {
        RepositoryOutcome::Cloned => tracing::info!(repository = %name, "cloned"),
        RepositoryOutcome::Updated => tracing::info!(repository = %name, "updated"),
        RepositoryOutcome::Skipped(reason) => {
            tracing::info!(repository = %name, %reason, "skipped")
        }
        RepositoryOutcome::Failed(err) => {
            tracing::warn!(repository = %name, error = %err, "failed")
        }
    }
}

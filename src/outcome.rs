use std::fmt;
use std::path::PathBuf;

use crate::error::{CloneError, MirrorError};

/// Why a repository was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoCloneUrl,
    /// Destination exists and the policy is `skip`.
    AlreadyPresent,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoCloneUrl => f.write_str("no clone URL"),
            SkipReason::AlreadyPresent => f.write_str("already present"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryOutcome {
    Cloned,
    Updated,
    Skipped(SkipReason),
    Failed(CloneError),
}

impl RepositoryOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RepositoryOutcome::Failed(_))
    }
}

impl fmt::Display for RepositoryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryOutcome::Cloned => f.write_str("cloned"),
            RepositoryOutcome::Updated => f.write_str("updated"),
            RepositoryOutcome::Skipped(reason) => write!(f, "skipped ({})", reason),
            RepositoryOutcome::Failed(err) => write!(f, "failed ({})", err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryResult {
    /// Display name of the repository.
    pub name: String,
    /// Where the repository was (or would have been) written.
    pub destination: Option<PathBuf>,
    pub outcome: RepositoryOutcome,
}

/// Per-repository results of one fetch, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub results: Vec<RepositoryResult>,
}

impl BatchSummary {
    pub fn new(results: Vec<RepositoryResult>) -> Self {
        Self { results }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Repositories for which a VCS operation was started.
    pub fn attempted(&self) -> usize {
        self.results
            .iter()
            .filter(|r| match &r.outcome {
                RepositoryOutcome::Cloned | RepositoryOutcome::Updated => true,
                RepositoryOutcome::Failed(err) => matches!(
                    err,
                    CloneError::Exit { .. } | CloneError::TimedOut(_) | CloneError::Unexpected(_)
                ),
                RepositoryOutcome::Skipped(_) => false,
            })
            .count()
    }

    pub fn cloned(&self) -> usize {
        self.count(|o| matches!(o, RepositoryOutcome::Cloned))
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, RepositoryOutcome::Updated))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RepositoryOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(RepositoryOutcome::is_failure)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RepositoryResult> {
        self.results.iter().filter(|r| r.outcome.is_failure())
    }

    fn count(&self, pred: impl Fn(&RepositoryOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} repositories: {} cloned, {} updated, {} skipped, {} failed",
            self.total(),
            self.cloned(),
            self.updated(),
            self.skipped(),
            self.failed()
        )
    }
}

/// Result of one fetch. `Ok` means the batch completed, possibly with
/// per-repository failures.
pub type BatchOutcome = Result<BatchSummary, MirrorError>;
